// this_file: crates/labelforge-input/src/workbook.rs

//! Spreadsheet workbooks (xlsx, xlsm, xlsb, xls, ods) read through calamine.
//!
//! Only the first worksheet is read. Cells become the same trimmed text rows
//! the CSV reader produces, numbered by their worksheet row.

use crate::sheet::Row;
use calamine::{open_workbook_auto, Data, Range, Reader};
use labelforge_core::{Error, Result};
use log::{debug, warn};
use std::path::Path;

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// True when the file extension names a workbook format.
pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map_or(false, |extension| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|known| extension.eq_ignore_ascii_case(known))
        })
}

pub(crate) fn load_workbook_rows(path: &Path) -> Result<Vec<Row>> {
    let invalid = |reason: String| Error::InvalidSheet {
        path: path.to_path_buf(),
        reason,
    };

    let mut workbook =
        open_workbook_auto(path).map_err(|err| invalid(format!("failed to open workbook: {err}")))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| invalid("workbook has no sheets".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|err| invalid(format!("failed to read sheet '{sheet_name}': {err}")))?;

    debug!(
        target: "labelforge::input",
        "reading sheet '{sheet_name}' of {} ({} x {} cells)",
        path.display(),
        range.height(),
        range.width()
    );
    Ok(rows_from_range(&range))
}

/// Rows of a worksheet range, keeping the sheet's own 1-based row numbers.
pub(crate) fn rows_from_range(range: &Range<Data>) -> Vec<Row> {
    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    range
        .rows()
        .enumerate()
        .map(|(offset, cells)| Row {
            line: first_row + offset + 1,
            cells: cells.iter().map(cell_text).collect(),
        })
        .collect()
}

/// Text of one cell as a CSV export would show it.
///
/// Whole numbers lose their fractional part so numeric barcodes and
/// quantities read back as digits.
pub(crate) fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.trim().to_string(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) => number_text(*value),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => number_text(value.as_f64()),
        Data::DateTimeIso(text) | Data::DurationIso(text) => text.trim().to_string(),
        Data::Error(err) => {
            warn!(target: "labelforge::input", "cell error {err:?} read as an empty cell");
            String::new()
        }
    }
}

fn number_text(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SheetLayout, SheetReader};
    use std::path::PathBuf;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata").join(name)
    }

    #[test]
    fn test_workbook_extensions() {
        assert!(is_workbook(Path::new("70056_export.xlsx")));
        assert!(is_workbook(Path::new("LABELS.XLS")));
        assert!(!is_workbook(Path::new("labels.csv")));
        assert!(!is_workbook(Path::new("xlsx")));
    }

    #[test]
    fn test_cell_text_matches_csv_exports() {
        assert_eq!(cell_text(&Data::Float(1234567890123.0)), "1234567890123");
        assert_eq!(cell_text(&Data::Float(3.0)), "3");
        assert_eq!(cell_text(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_text(&Data::Int(70056)), "70056");
        assert_eq!(cell_text(&Data::String("  Model Code ".to_string())), "Model Code");
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
    }

    #[test]
    fn test_rows_keep_worksheet_numbering() {
        let mut range = Range::new((2, 0), (4, 1));
        range.set_value((2, 0), Data::String("MODEL".to_string()));
        range.set_value((2, 1), Data::String("TOTAL".to_string()));
        range.set_value((4, 0), Data::String("A1".to_string()));
        range.set_value((4, 1), Data::Float(2.0));

        let rows = rows_from_range(&range);
        let lines: Vec<usize> = rows.iter().map(|row| row.line).collect();
        assert_eq!(lines, vec![3, 4, 5]);
        assert!(rows[1].cells.iter().all(String::is_empty));
        assert_eq!(rows[2].cells, vec!["A1", "2"]);
    }

    #[test]
    fn test_flat_workbook_reads_like_csv() {
        let sheet = SheetReader::new(SheetLayout::Flat)
            .read_path(&fixture("flat_labels.xlsx"))
            .unwrap();
        assert_eq!(sheet.header_row, 1);
        assert_eq!(sheet.records.len(), 2);

        let first = &sheet.records[0];
        assert_eq!(first.po_no, "70056");
        assert_eq!(first.model, "A1");
        assert_eq!(first.barcode_value, "1234567890123");
        assert_eq!(first.quantity.get(), 3);
        assert_eq!(first.source_row, 2);

        let second = &sheet.records[1];
        assert_eq!(second.source_row, 4);
        assert!(second.quantity.was_coerced());
    }

    #[test]
    fn test_corrupt_workbook_is_invalid_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("70056_export.xlsx");
        std::fs::write(&path, b"PO_NO,MODEL\n70056,A1\n").unwrap();
        let err = SheetReader::new(SheetLayout::Supplier)
            .read_path(&path)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSheet { .. }));

        let missing = SheetReader::new(SheetLayout::Flat).read_path(&dir.path().join("absent.xlsx"));
        assert!(matches!(missing, Err(Error::InvalidSheet { .. })));
    }
}
