// this_file: crates/labelforge-core/src/traits.rs

//! Seams between the layout engine and the font machinery.

use crate::types::FontRole;

/// Horizontal text measurement for a resolved font set.
///
/// The layout engine only needs widths to apply overflow policies; the
/// renderer's font set implements this, tests use fixed-advance fakes.
pub trait TextMeasure: Send + Sync {
    /// Advance width in pixels of visual-order `text` set in `role`.
    fn advance_width(&self, role: FontRole, text: &str) -> f32;
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn advance_width(&self, role: FontRole, text: &str) -> f32 {
        (**self).advance_width(role, text)
    }
}

impl<T: TextMeasure + ?Sized> TextMeasure for std::sync::Arc<T> {
    fn advance_width(&self, role: FontRole, text: &str) -> f32 {
        (**self).advance_width(role, text)
    }
}
