// this_file: crates/labelforge-input/src/lib.rs

//! Sheet ingestion for labelforge.
//!
//! Turns a CSV export or a spreadsheet workbook into
//! [`LabelRecord`](labelforge_core::LabelRecord)s.
//! Column problems are detected here, before any rendering starts.

pub mod columns;
pub mod sheet;
pub mod workbook;

pub use columns::{normalize_header, SheetLayout, REQUIRED_COLUMNS};
pub use sheet::{po_number_from_path, read_sheet, Sheet, SheetReader};
pub use workbook::is_workbook;
