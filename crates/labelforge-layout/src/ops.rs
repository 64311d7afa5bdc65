// this_file: crates/labelforge-layout/src/ops.rs

//! Positioned drawing operations.

use labelforge_barcode::{ScaledSymbol, SymbolImage};
use labelforge_core::{Align, Direction, FontRole};
use labelforge_unicode::ShapeOutcome;
use std::fmt;

/// Template section an op belongs to, used in overflow reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Brand,
    Fields,
    Barcode,
    BarcodeEcho,
    Static,
    Footer,
}

impl Section {
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Brand => "brand",
            Section::Fields => "fields",
            Section::Barcode => "barcode",
            Section::BarcodeEcho => "barcode echo",
            Section::Static => "static block",
            Section::Footer => "footer",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content of an image block.
#[derive(Debug, Clone)]
pub enum ImageContent {
    /// Barcode symbol already fitted to its region
    Symbol {
        symbol: SymbolImage,
        scaled: ScaledSymbol,
    },
    /// The shared brand logo
    Logo,
}

#[derive(Debug, Clone)]
pub enum OpKind {
    Text {
        /// Visual-order text
        content: String,
        role: FontRole,
        align: Align,
        direction: Direction,
        outcome: ShapeOutcome,
    },
    Image {
        content: ImageContent,
        width: u32,
        height: u32,
    },
}

/// One drawing instruction. For text `(x, y)` is the alignment anchor on the
/// top edge of the line box; for images it is the top-left corner.
#[derive(Debug, Clone)]
pub struct PositionedOp {
    pub kind: OpKind,
    pub x: u32,
    pub y: u32,
    /// Bottom edge of the op's vertical extent
    pub bottom: u32,
    pub section: Section,
}

impl PositionedOp {
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            OpKind::Text { content, .. } => Some(content),
            OpKind::Image { .. } => None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind, OpKind::Image { .. })
    }
}
