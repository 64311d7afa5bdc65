// this_file: crates/labelforge-core/src/types.rs

//! Core types used throughout the labelforge pipeline.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

/// Number of identical physical labels to emit for one record.
///
/// Always at least one. When the source cell was unusable the raw value is
/// kept so the coercion can be reported instead of disappearing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantity {
    count: NonZeroU32,
    coerced_from: Option<String>,
}

impl Quantity {
    pub fn new(count: NonZeroU32) -> Self {
        Self {
            count,
            coerced_from: None,
        }
    }

    /// Parse a spreadsheet cell.
    ///
    /// Integral numbers are accepted in either integer (`"3"`) or float
    /// (`"3.0"`) notation. Anything else, including zero and negatives,
    /// becomes a quantity of one that remembers the raw text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let parsed = trimmed.parse::<i64>().ok().or_else(|| {
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite() && value.fract() == 0.0)
                .map(|value| value as i64)
        });

        match parsed
            .and_then(|value| u32::try_from(value).ok())
            .and_then(NonZeroU32::new)
        {
            Some(count) => Self::new(count),
            None => Self {
                count: NonZeroU32::MIN,
                coerced_from: Some(raw.to_string()),
            },
        }
    }

    pub fn get(&self) -> u32 {
        self.count.get()
    }

    /// The reportable error when the quantity had to be coerced.
    pub fn coercion(&self) -> Option<Error> {
        self.coerced_from
            .as_ref()
            .map(|raw| Error::InvalidQuantity { raw: raw.clone() })
    }

    pub fn was_coerced(&self) -> bool {
        self.coerced_from.is_some()
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::new(NonZeroU32::MIN)
    }
}

/// One product row, immutable once ingested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRecord {
    pub po_no: String,
    pub model: String,
    pub r#ref: String,
    pub size: String,
    pub style_code: String,
    pub barcode_value: String,
    pub quantity: Quantity,
    /// 1-based row in the source sheet, used in reports
    pub source_row: usize,
}

impl LabelRecord {
    /// Value of a dynamic field as substituted into label templates.
    pub fn field(&self, field: RecordField) -> &str {
        match field {
            RecordField::PoNo => &self.po_no,
            RecordField::Model => &self.model,
            RecordField::Ref => &self.r#ref,
            RecordField::Size => &self.size,
            RecordField::StyleCode => &self.style_code,
            RecordField::Barcode => &self.barcode_value,
        }
    }

    /// Short identifier for logs and summaries.
    pub fn describe(&self) -> String {
        format!(
            "row {} (model {}, barcode {})",
            self.source_row, self.model, self.barcode_value
        )
    }
}

/// Record attributes addressable from template placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    PoNo,
    Model,
    Ref,
    Size,
    StyleCode,
    Barcode,
}

impl RecordField {
    pub const ALL: [RecordField; 6] = [
        RecordField::PoNo,
        RecordField::Model,
        RecordField::Ref,
        RecordField::Size,
        RecordField::StyleCode,
        RecordField::Barcode,
    ];

    /// Placeholder name used inside `{...}` in field templates.
    pub fn placeholder(self) -> &'static str {
        match self {
            RecordField::PoNo => "po_no",
            RecordField::Model => "model",
            RecordField::Ref => "ref",
            RecordField::Size => "size",
            RecordField::StyleCode => "style_code",
            RecordField::Barcode => "barcode",
        }
    }

    pub fn from_placeholder(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.placeholder() == name)
    }
}

/// Typographic role of a text line; each role resolves to one font and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontRole {
    Brand,
    Field,
    /// Right-to-left static lines
    Static,
    /// Left-to-right static lines, set in smaller type
    StaticSmall,
    Footer,
}

impl FontRole {
    pub const ALL: [FontRole; 5] = [
        FontRole::Brand,
        FontRole::Field,
        FontRole::Static,
        FontRole::StaticSmall,
        FontRole::Footer,
    ];

    /// Position in [`FontRole::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FontRole::Brand => "brand",
            FontRole::Field => "field",
            FontRole::Static => "static",
            FontRole::StaticSmall => "static_small",
            FontRole::Footer => "footer",
        }
    }
}

impl fmt::Display for FontRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Script direction of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    LeftToRight,
    RightToLeft,
}

impl Direction {
    pub fn is_rtl(self) -> bool {
        self == Direction::RightToLeft
    }
}

/// Horizontal alignment of a text op relative to its anchor x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Center,
    Right,
}
