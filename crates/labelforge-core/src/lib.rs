// this_file: crates/labelforge-core/src/lib.rs

//! Core traits and types for the labelforge label composition engine.

pub mod diagnostics;
pub mod error;
pub mod surface;
pub mod template;
pub mod traits;
pub mod types;
pub mod utils;

pub use diagnostics::LayoutDiagnostics;
pub use error::{Error, ErrorClass};
pub use surface::RenderSurface;
pub use template::{
    BarcodeSection, BrandSection, CanvasSpec, FieldSection, FontSizes, FooterLine, FooterSection,
    LabelTemplate, OverflowPolicy, StaticSection,
};
pub use traits::TextMeasure;
pub use types::{Align, Direction, FontRole, LabelRecord, Quantity, RecordField};

/// Result type for labelforge operations
pub type Result<T> = std::result::Result<T, Error>;
