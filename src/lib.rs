// this_file: src/lib.rs

//! labelforge: print-label composition.
//!
//! Each product record becomes a fixed-size raster label with a brand mark,
//! per-record fields, a Code 128 barcode, a bilingual Latin/Arabic importer
//! block and a footer. Records are composed in parallel and written in input
//! order as PNG files or pages of one PDF.
//!
//! ```no_run
//! use labelforge::{
//!     read_sheet, BatchComposer, BatchOptions, OutputMode, ResourceConfig, Resources, SheetLayout,
//! };
//! use std::sync::Arc;
//!
//! # fn main() -> labelforge::Result<()> {
//! let sheet = read_sheet("labels.csv".as_ref(), SheetLayout::Flat)?;
//! let resources = Arc::new(Resources::load(ResourceConfig::default())?);
//! let options = BatchOptions {
//!     mode: OutputMode::Files { dir: "out".into() },
//!     jobs: 0,
//! };
//! let report = BatchComposer::new(resources).run(&sheet.records, &options)?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub use labelforge_barcode as barcode;
pub use labelforge_core as core;
pub use labelforge_fontdb as fontdb;
pub use labelforge_input as input;
pub use labelforge_layout as layout;
pub use labelforge_render as render;
pub use labelforge_unicode as unicode;

pub use labelforge_barcode::{decode, scan_row, BarcodeEncoder, SymbolImage};
pub use labelforge_core::{
    Align, Direction, Error, ErrorClass, FontRole, LabelRecord, LabelTemplate, OverflowPolicy,
    Quantity, RenderSurface, Result,
};
pub use labelforge_fontdb::{FontConfig, FontSet};
pub use labelforge_input::{read_sheet, Sheet, SheetLayout, SheetReader};
pub use labelforge_layout::{Composition, LayoutEngine, PositionedOp};
pub use labelforge_render::{
    BatchComposer, BatchOptions, BatchReport, CancelToken, OutputMode, ProgressEvent,
    ProgressSink, RenderedLabel, Renderer, ResourceConfig, Resources,
};
pub use labelforge_unicode::{ShapeOutcome, ShapedLine, ShapingCapability, TextShaper};
