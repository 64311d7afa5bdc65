// this_file: crates/labelforge-render/src/lib.rs

//! Rendering and batch composition for labelforge.
//!
//! [`Resources`] are loaded once and shared; a [`Renderer`] turns one record
//! into a [`RenderedLabel`]; the [`BatchComposer`] fans records out over a
//! worker pool and reassembles the results in input order.

pub mod batch;
pub mod glyphs;
pub mod pdf;
pub mod renderer;
pub mod resources;
pub mod sink;

pub use batch::{
    BatchComposer, BatchOptions, BatchReport, CancelToken, ProgressEvent, ProgressSink,
    RecordIssue,
};
pub use renderer::{RenderedLabel, Renderer};
pub use resources::{ResourceConfig, Resources};
pub use sink::{EncodedLabel, FileSink, LabelSink, OutputMode, PdfSink};
