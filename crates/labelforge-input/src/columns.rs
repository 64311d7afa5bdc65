// this_file: crates/labelforge-input/src/columns.rs

//! Column identifiers and header normalization.

use labelforge_core::RecordField;
use std::fmt;
use std::str::FromStr;

/// Columns a flat sheet must carry, after normalization.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "PO_NO",
    "MODEL",
    "REF",
    "SIZE",
    "STYLE_CODE",
    "BARCODE",
    "TOTAL",
];

/// Supplier export headers and the record field each one feeds.
pub(crate) const SUPPLIER_COLUMNS: [(&str, RecordField); 5] = [
    ("MODEL CODE", RecordField::Model),
    ("STYLI OPTION ID", RecordField::Ref),
    ("SIZE", RecordField::Size),
    ("VENDOR STYLE NUMBER", RecordField::StyleCode),
    ("STYLI SKU", RecordField::Barcode),
];

/// Optional quantity headers in supplier exports, in preference order.
pub(crate) const SUPPLIER_QUANTITY_COLUMNS: [&str; 2] = ["TOTAL", "QTY"];

/// Rows searched for the supplier header.
pub(crate) const SUPPLIER_HEADER_SCAN: usize = 20;

/// Shape of the input sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetLayout {
    /// Header in the first row, canonical column names
    #[default]
    Flat,
    /// Supplier export: header somewhere in the first rows, PO number in the file name
    Supplier,
}

impl SheetLayout {
    pub fn as_str(self) -> &'static str {
        match self {
            SheetLayout::Flat => "flat",
            SheetLayout::Supplier => "supplier",
        }
    }
}

impl fmt::Display for SheetLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SheetLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(SheetLayout::Flat),
            "supplier" => Ok(SheetLayout::Supplier),
            other => Err(format!("unknown sheet layout '{other}'")),
        }
    }
}

/// Trim, uppercase and join inner whitespace with `_`.
///
/// `" style code "` becomes `STYLE_CODE`.
pub fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .split_whitespace()
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Supplier headers keep their spaces; only case and spacing are folded.
pub(crate) fn normalize_supplier_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .split_whitespace()
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Flat-sheet column for a record field.
pub(crate) fn flat_column(field: RecordField) -> &'static str {
    match field {
        RecordField::PoNo => "PO_NO",
        RecordField::Model => "MODEL",
        RecordField::Ref => "REF",
        RecordField::Size => "SIZE",
        RecordField::StyleCode => "STYLE_CODE",
        RecordField::Barcode => "BARCODE",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header(" style code "), "STYLE_CODE");
        assert_eq!(normalize_header("Po  No"), "PO_NO");
        assert_eq!(normalize_header("\u{feff}model"), "MODEL");
        assert_eq!(normalize_header("BARCODE"), "BARCODE");
    }

    #[test]
    fn test_supplier_header_keeps_spaces() {
        assert_eq!(normalize_supplier_header(" styli  sku"), "STYLI SKU");
    }

    #[test]
    fn test_every_field_has_a_required_column() {
        for field in RecordField::ALL {
            assert!(REQUIRED_COLUMNS.contains(&flat_column(field)));
        }
    }

    #[test]
    fn test_layout_from_str() {
        assert_eq!("Supplier".parse::<SheetLayout>(), Ok(SheetLayout::Supplier));
        assert_eq!("flat".parse::<SheetLayout>(), Ok(SheetLayout::Flat));
        assert!("xlsx".parse::<SheetLayout>().is_err());
    }
}
