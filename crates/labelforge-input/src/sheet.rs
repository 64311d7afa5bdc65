// this_file: crates/labelforge-input/src/sheet.rs

//! Sheet reading for both supported layouts.

use crate::columns::{
    flat_column, normalize_header, normalize_supplier_header, SheetLayout, REQUIRED_COLUMNS,
    SUPPLIER_COLUMNS, SUPPLIER_HEADER_SCAN, SUPPLIER_QUANTITY_COLUMNS,
};
use crate::workbook::{is_workbook, load_workbook_rows};
use labelforge_core::{Error, LabelRecord, Quantity, RecordField, Result};
use log::{debug, info};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Records read from one sheet.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub layout: SheetLayout,
    /// 1-based line of the header row
    pub header_row: usize,
    pub records: Vec<LabelRecord>,
}

impl Sheet {
    /// Total labels the sheet asks for, counting coerced quantities as one.
    pub fn label_count(&self) -> u64 {
        self.records
            .iter()
            .map(|record| u64::from(record.quantity.get()))
            .sum()
    }

    pub fn coerced_count(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.quantity.was_coerced())
            .count()
    }
}

/// Reads sheets of one layout.
#[derive(Debug, Clone, Default)]
pub struct SheetReader {
    layout: SheetLayout,
    po_number: Option<String>,
}

impl SheetReader {
    pub fn new(layout: SheetLayout) -> Self {
        Self {
            layout,
            po_number: None,
        }
    }

    /// Override the PO number a supplier sheet takes from its file name.
    pub fn with_po_number(mut self, po_number: impl Into<String>) -> Self {
        self.po_number = Some(po_number.into());
        self
    }

    /// Read a sheet file; workbooks are picked by extension, anything else
    /// is read as CSV.
    pub fn read_path(&self, path: &Path) -> Result<Sheet> {
        if is_workbook(path) {
            let rows = load_workbook_rows(path)?;
            return self.read_rows(&rows, path);
        }
        let file = File::open(path).map_err(|err| invalid(path, err))?;
        self.read(file, path)
    }

    /// Read CSV from any source; `origin` names it in errors and supplies
    /// the supplier PO number.
    pub fn read<R: Read>(&self, reader: R, origin: &Path) -> Result<Sheet> {
        let rows = load_rows(reader, origin)?;
        self.read_rows(&rows, origin)
    }

    fn read_rows(&self, rows: &[Row], origin: &Path) -> Result<Sheet> {
        if rows.is_empty() {
            return Err(invalid(origin, "sheet is empty"));
        }

        let sheet = match self.layout {
            SheetLayout::Flat => read_flat(rows)?,
            SheetLayout::Supplier => {
                let po_number = self
                    .po_number
                    .clone()
                    .unwrap_or_else(|| po_number_from_path(origin));
                read_supplier(rows, &po_number)?
            }
        };

        info!(
            target: "labelforge::input",
            "loaded {} records from {} ({} layout, header on line {})",
            sheet.records.len(),
            origin.display(),
            sheet.layout,
            sheet.header_row
        );
        Ok(sheet)
    }
}

/// Read a sheet file in the given layout.
pub fn read_sheet(path: &Path, layout: SheetLayout) -> Result<Sheet> {
    SheetReader::new(layout).read_path(path)
}

/// PO number encoded in a supplier file name: the part before the first `_`,
/// or the name up to its first `.` when there is no underscore.
pub fn po_number_from_path(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let separator = if name.contains('_') { '_' } else { '.' };
    name.split(separator).next().unwrap_or_default().to_string()
}

/// One physical sheet row with its 1-based line number.
pub(crate) struct Row {
    pub(crate) line: usize,
    pub(crate) cells: Vec<String>,
}

impl Row {
    fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }

    fn is_blank(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_empty())
    }
}

fn invalid(origin: &Path, reason: impl ToString) -> Error {
    Error::InvalidSheet {
        path: origin.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn load_rows<R: Read>(mut reader: R, origin: &Path) -> Result<Vec<Row>> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|err| invalid(origin, err))?;

    // csv skips empty lines without counting them, so lines come from offsets
    let line_starts: Vec<usize> = std::iter::once(0)
        .chain(
            bytes
                .iter()
                .enumerate()
                .filter(|&(_, &byte)| byte == b'\n')
                .map(|(index, _)| index + 1),
        )
        .collect();

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes.as_slice());

    let mut rows = Vec::new();
    for (offset, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|err| invalid(origin, err))?;
        let line = match record.position() {
            Some(position) => {
                let mut start = position.byte() as usize;
                while matches!(bytes.get(start), Some(b'\r' | b'\n')) {
                    start += 1;
                }
                line_starts.partition_point(|&line_start| line_start <= start)
            }
            None => offset + 1,
        };
        rows.push(Row {
            line,
            cells: record.iter().map(str::to_string).collect(),
        });
    }
    Ok(rows)
}

fn index_columns(names: impl Iterator<Item = String>) -> HashMap<String, usize> {
    let mut columns = HashMap::new();
    for (index, name) in names.enumerate() {
        columns.entry(name).or_insert(index);
    }
    columns
}

fn read_flat(rows: &[Row]) -> Result<Sheet> {
    let header = &rows[0];
    let columns = index_columns(header.cells.iter().map(|cell| normalize_header(cell)));

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| !columns.contains_key(**name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(Error::MissingColumns { missing });
    }

    let field_index = |field: RecordField| columns[flat_column(field)];
    let total = columns["TOTAL"];

    let records = rows[1..]
        .iter()
        .filter(|row| !row.is_blank())
        .map(|row| LabelRecord {
            po_no: row.cell(field_index(RecordField::PoNo)).to_string(),
            model: row.cell(field_index(RecordField::Model)).to_string(),
            r#ref: row.cell(field_index(RecordField::Ref)).to_string(),
            size: row.cell(field_index(RecordField::Size)).to_string(),
            style_code: row.cell(field_index(RecordField::StyleCode)).to_string(),
            barcode_value: row.cell(field_index(RecordField::Barcode)).to_string(),
            quantity: Quantity::parse(row.cell(total)),
            source_row: row.line,
        })
        .collect();

    Ok(Sheet {
        layout: SheetLayout::Flat,
        header_row: header.line,
        records,
    })
}

fn read_supplier(rows: &[Row], po_number: &str) -> Result<Sheet> {
    let mut fewest_missing: Option<Vec<String>> = None;

    for (position, header) in rows.iter().take(SUPPLIER_HEADER_SCAN).enumerate() {
        let columns = index_columns(
            header
                .cells
                .iter()
                .map(|cell| normalize_supplier_header(cell)),
        );
        let missing: Vec<String> = SUPPLIER_COLUMNS
            .iter()
            .filter(|(name, _)| !columns.contains_key(*name))
            .map(|(name, _)| name.to_string())
            .collect();

        if missing.is_empty() {
            debug!(
                target: "labelforge::input",
                "supplier header found on line {}",
                header.line
            );
            return Ok(supplier_records(&rows[position..], &columns, po_number));
        }
        if fewest_missing
            .as_ref()
            .map_or(true, |fewest| missing.len() < fewest.len())
        {
            fewest_missing = Some(missing);
        }
    }

    Err(Error::MissingColumns {
        missing: fewest_missing.unwrap_or_else(|| {
            SUPPLIER_COLUMNS
                .iter()
                .map(|(name, _)| name.to_string())
                .collect()
        }),
    })
}

fn supplier_records(rows: &[Row], columns: &HashMap<String, usize>, po_number: &str) -> Sheet {
    let index_of = |wanted: RecordField| {
        SUPPLIER_COLUMNS
            .iter()
            .find(|(_, field)| *field == wanted)
            .and_then(|(name, _)| columns.get(*name).copied())
    };
    let quantity = SUPPLIER_QUANTITY_COLUMNS
        .iter()
        .find_map(|name| columns.get(*name).copied());

    let cell = |row: &Row, field: RecordField| {
        index_of(field)
            .map(|index| row.cell(index).to_string())
            .unwrap_or_default()
    };

    let records = rows[1..]
        .iter()
        .filter(|row| !row.is_blank())
        .map(|row| LabelRecord {
            po_no: po_number.to_string(),
            model: cell(row, RecordField::Model),
            r#ref: cell(row, RecordField::Ref),
            size: cell(row, RecordField::Size),
            style_code: cell(row, RecordField::StyleCode),
            barcode_value: cell(row, RecordField::Barcode),
            quantity: quantity
                .map(|index| Quantity::parse(row.cell(index)))
                .unwrap_or_default(),
            source_row: row.line,
        })
        .collect();

    Sheet {
        layout: SheetLayout::Supplier,
        header_row: rows[0].line,
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn flat(csv: &str) -> Result<Sheet> {
        SheetReader::new(SheetLayout::Flat).read(csv.as_bytes(), Path::new("sheet.csv"))
    }

    #[test]
    fn test_flat_sheet_normalizes_headers() {
        let sheet = flat(
            "po no, Model ,ref,SIZE,style code,Barcode,total\n\
             70056,A1,R9,M,SC1,1234567890,3\n\
             \n\
             70056,A2,R9,L,SC1,1234567891,abc\n",
        )
        .unwrap();

        assert_eq!(sheet.header_row, 1);
        assert_eq!(sheet.records.len(), 2);
        let first = &sheet.records[0];
        assert_eq!(first.model, "A1");
        assert_eq!(first.barcode_value, "1234567890");
        assert_eq!(first.quantity.get(), 3);
        assert_eq!(first.source_row, 2);

        let second = &sheet.records[1];
        assert_eq!(second.source_row, 4);
        assert!(second.quantity.was_coerced());
        assert_eq!(sheet.label_count(), 4);
        assert_eq!(sheet.coerced_count(), 1);
    }

    #[test]
    fn test_rows_after_runs_of_blank_lines_keep_their_line() {
        let sheet = flat(
            "PO_NO,MODEL,REF,SIZE,STYLE_CODE,BARCODE,TOTAL\r\n\
             \r\n\
             \r\n\
             70056,A1,R9,M,SC1,1234567890,1\r\n\
             70056,\"A2\nB\",R9,L,SC1,1234567891,1\r\n\
             \n\
             70056,A3,R9,S,SC1,1234567892,1\r\n",
        )
        .unwrap();
        let rows: Vec<usize> = sheet.records.iter().map(|record| record.source_row).collect();
        assert_eq!(rows, vec![4, 5, 8]);
        assert_eq!(sheet.records[1].model, "A2\nB");
    }

    #[test]
    fn test_flat_sheet_reports_every_missing_column() {
        let err = flat("PO_NO,MODEL,REF,SIZE,STYLE_CODE\n1,2,3,4,5\n").unwrap_err();
        match err {
            Error::MissingColumns { missing } => assert_eq!(missing, vec!["BARCODE", "TOTAL"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_short_rows_read_as_empty_cells() {
        let sheet = flat("PO_NO,MODEL,REF,SIZE,STYLE_CODE,BARCODE,TOTAL\n70056,A1\n").unwrap();
        let record = &sheet.records[0];
        assert_eq!(record.model, "A1");
        assert_eq!(record.barcode_value, "");
        assert!(record.quantity.was_coerced());
    }

    #[test]
    fn test_empty_sheet_is_invalid() {
        assert!(matches!(flat(""), Err(Error::InvalidSheet { .. })));
    }

    #[test]
    fn test_supplier_sheet_finds_header_and_po_number() {
        let csv = "Purchase order export,,,,,\n\
                   Generated 2024-05-01,,,,,\n\
                   ,,,,,\n\
                   Model Code,Styli Option ID,Size,Vendor Style Number,Styli SKU,Qty\n\
                   A1,R9,M,SC1,1234567890,2\n\
                   A2,R9,L,SC1,1234567891,\n";
        let sheet = SheetReader::new(SheetLayout::Supplier)
            .read(csv.as_bytes(), Path::new("/data/70056_supplier_export.csv"))
            .unwrap();

        assert_eq!(sheet.header_row, 4);
        assert_eq!(sheet.records.len(), 2);
        assert_eq!(sheet.records[0].po_no, "70056");
        assert_eq!(sheet.records[0].quantity.get(), 2);
        assert_eq!(sheet.records[0].source_row, 5);
        assert!(sheet.records[1].quantity.was_coerced());
    }

    #[test]
    fn test_supplier_sheet_without_quantity_column_defaults_to_one() {
        let csv = "MODEL CODE,STYLI OPTION ID,SIZE,VENDOR STYLE NUMBER,STYLI SKU\n\
                   A1,R9,M,SC1,1234567890\n";
        let sheet = SheetReader::new(SheetLayout::Supplier)
            .with_po_number("PO-1")
            .read(csv.as_bytes(), Path::new("export.csv"))
            .unwrap();
        let record = &sheet.records[0];
        assert_eq!(record.po_no, "PO-1");
        assert_eq!(record.quantity.get(), 1);
        assert!(!record.quantity.was_coerced());
    }

    #[test]
    fn test_supplier_sheet_missing_columns_uses_closest_row() {
        let csv = "title\nMODEL CODE,SIZE,STYLI SKU\nA1,M,1\n";
        let err = SheetReader::new(SheetLayout::Supplier)
            .read(csv.as_bytes(), Path::new("1_x.csv"))
            .unwrap_err();
        match err {
            Error::MissingColumns { missing } => {
                assert_eq!(missing, vec!["STYLI OPTION ID", "VENDOR STYLE NUMBER"])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_po_number_from_path() {
        assert_eq!(po_number_from_path(Path::new("/x/70056_export.csv")), "70056");
        assert_eq!(po_number_from_path(Path::new("70056.csv")), "70056");
        assert_eq!(po_number_from_path(&PathBuf::from("plain")), "plain");
    }

    #[test]
    fn test_read_sheet_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.csv");
        std::fs::write(
            &path,
            "PO_NO,MODEL,REF,SIZE,STYLE_CODE,BARCODE,TOTAL\n70056,A1,R9,M,SC1,1234567890,1\n",
        )
        .unwrap();
        let sheet = read_sheet(&path, SheetLayout::Flat).unwrap();
        assert_eq!(sheet.records.len(), 1);

        let missing = read_sheet(&dir.path().join("absent.csv"), SheetLayout::Flat);
        assert!(matches!(missing, Err(Error::InvalidSheet { .. })));
    }
}
