// this_file: crates/labelforge-fontdb/src/face.rs

//! A resolved face: either a parsed outline font or the bitmap fallback.

use crate::builtin;
use owned_ttf_parser::{AsFaceRef, Face, GlyphId, OwnedFace};
use std::fmt;

pub enum FontFace {
    Outline(OwnedFace),
    Builtin,
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontFace::Outline(face) => f
                .debug_struct("Outline")
                .field("glyphs", &face.as_face_ref().number_of_glyphs())
                .field("units_per_em", &face.as_face_ref().units_per_em())
                .finish(),
            FontFace::Builtin => f.write_str("Builtin"),
        }
    }
}

impl FontFace {
    /// Parse font bytes; `None` when the data is not a usable face.
    pub fn from_data(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = OwnedFace::from_vec(data, index).ok()?;
        if face.as_face_ref().units_per_em() == 0 {
            return None;
        }
        Some(FontFace::Outline(face))
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, FontFace::Builtin)
    }

    /// Parsed outline face, if any.
    pub fn outline(&self) -> Option<&Face<'_>> {
        match self {
            FontFace::Outline(face) => Some(face.as_face_ref()),
            FontFace::Builtin => None,
        }
    }

    /// Font units to pixels at `size_px`.
    pub fn scale(&self, size_px: f32) -> f32 {
        match self.outline() {
            Some(face) => size_px / face.units_per_em() as f32,
            None => builtin::unit(size_px),
        }
    }

    /// Glyph for `ch`, `.notdef` when unmapped.
    pub fn glyph_id(&self, ch: char) -> GlyphId {
        self.outline()
            .and_then(|face| face.glyph_index(ch))
            .unwrap_or(GlyphId(0))
    }

    /// Horizontal advance of one character in pixels.
    pub fn char_advance(&self, ch: char, size_px: f32) -> f32 {
        match self.outline() {
            Some(face) => {
                let advance = face.glyph_hor_advance(self.glyph_id(ch)).unwrap_or(0);
                advance as f32 * self.scale(size_px)
            }
            None => builtin::advance_width(ch.encode_utf8(&mut [0; 4]), size_px),
        }
    }

    /// Horizontal advance of a visual-order string in pixels.
    pub fn advance_width(&self, text: &str, size_px: f32) -> f32 {
        match self {
            FontFace::Outline(_) => text.chars().map(|ch| self.char_advance(ch, size_px)).sum(),
            FontFace::Builtin => builtin::advance_width(text, size_px),
        }
    }

    /// Distance from the top of the line box to the baseline.
    pub fn ascent(&self, size_px: f32) -> f32 {
        match self.outline() {
            Some(face) => face.ascender() as f32 * self.scale(size_px),
            None => builtin::ascent(size_px),
        }
    }

    /// True when every character of `text` maps to a real glyph.
    pub fn covers(&self, text: &str) -> bool {
        match self.outline() {
            Some(face) => text
                .chars()
                .filter(|ch| !ch.is_whitespace())
                .all(|ch| face.glyph_index(ch).is_some()),
            None => text.chars().all(|ch| (' '..='~').contains(&ch)),
        }
    }
}
