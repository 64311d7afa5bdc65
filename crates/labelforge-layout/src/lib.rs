// this_file: crates/labelforge-layout/src/lib.rs

//! Label layout for labelforge.
//!
//! The [`LayoutEngine`] walks the template top to bottom with a single
//! cursor, emitting [`PositionedOp`]s in paint order. It never draws; the
//! renderer consumes the ops once.

pub mod engine;
pub mod fit;
pub mod ops;

pub use engine::{Composition, LayoutEngine};
pub use fit::fit_line;
pub use ops::{ImageContent, OpKind, PositionedOp, Section};
