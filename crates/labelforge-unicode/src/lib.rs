// this_file: crates/labelforge-unicode/src/lib.rs

//! Script direction and visual-order shaping for label text.
//!
//! Lines are rasterised strictly left to right, so right-to-left text has to
//! arrive here in logical order and leave in visual order with Arabic letters
//! already joined into their contextual presentation forms.

pub mod direction;
pub mod shaper;

pub use direction::{classify_direction, is_presentation_form, StaticLine, StaticTextBlock};
pub use shaper::{ShapeOutcome, ShapeSource, ShapedLine, ShapingCapability, TextShaper};

#[cfg(test)]
mod proptests;
