// this_file: crates/labelforge-core/src/error.rs

//! Error types for labelforge.
//!
//! Every error carries enough context to be listed in the batch summary, and
//! maps to an [`ErrorClass`] that tells the batch composer whether to abort
//! the run or skip the record and carry on.

use std::path::PathBuf;
use thiserror::Error;

/// How the batch composer treats an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Detected before any rendering starts; aborts the run.
    Configuration,
    /// Scoped to a single record; the record is skipped or defaulted.
    Record,
    /// A shared resource failed mid-run (output I/O, encoders); aborts the batch.
    Resource,
}

/// Main error type for labelforge operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Input sheet lacks one or more required columns
    #[error("Missing required columns: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    /// Input sheet could not be interpreted at all
    #[error("Invalid input sheet {path}: {reason}")]
    InvalidSheet { path: PathBuf, reason: String },

    /// Every source in a font fallback chain failed
    #[error("No usable font for role '{role}' (tried: {})", tried.join(", "))]
    NoFontAvailable { role: String, tried: Vec<String> },

    /// Template values are inconsistent
    #[error("Invalid label template: {reason}")]
    InvalidTemplate { reason: String },

    /// Quantity cell could not be read as a positive integer
    #[error("Invalid quantity '{raw}', defaulting to 1")]
    InvalidQuantity { raw: String },

    /// Barcode value is empty
    #[error("Barcode value is empty")]
    EmptyBarcode,

    /// Barcode value contains a character the symbology cannot encode
    #[error("Character {ch:?} at position {position} cannot be encoded in Code 128")]
    UnsupportedBarcodeChar { ch: char, position: usize },

    /// Symbol does not fit its region at the minimum module width
    #[error(
        "Barcode of {modules} modules needs {needed}px at {min_module_width}px/module, region is {available}px wide"
    )]
    SymbolTooSmall {
        modules: u32,
        min_module_width: u32,
        needed: u32,
        available: u32,
    },

    /// Scanned bars do not form a valid symbol
    #[error("Symbol decode failed: {reason}")]
    SymbolDecode { reason: String },

    /// Composition needs more vertical space than the canvas offers
    #[error("Layout overflow in {section}: content reaches {needed}px, canvas height is {available}px")]
    LayoutOverflow {
        section: String,
        needed: u32,
        available: u32,
    },

    /// Image could not be decoded
    #[error("Failed to decode image {path}: {reason}")]
    ImageDecode { path: PathBuf, reason: String },

    /// Output encoding failed (PNG, PDF)
    #[error("Encoding error: {0}")]
    Encode(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error (should not happen in production)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Classify the error for the batch policy.
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::MissingColumns { .. }
            | Error::InvalidSheet { .. }
            | Error::NoFontAvailable { .. }
            | Error::InvalidTemplate { .. } => ErrorClass::Configuration,
            Error::InvalidQuantity { .. }
            | Error::EmptyBarcode
            | Error::UnsupportedBarcodeChar { .. }
            | Error::SymbolTooSmall { .. }
            | Error::SymbolDecode { .. }
            | Error::LayoutOverflow { .. } => ErrorClass::Record,
            Error::ImageDecode { .. }
            | Error::Encode(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::Internal(_) => ErrorClass::Resource,
        }
    }

    /// True when the error only affects the record it was raised for.
    pub fn is_record_scoped(&self) -> bool {
        self.class() == ErrorClass::Record
    }

    pub fn template(reason: impl Into<String>) -> Self {
        Error::InvalidTemplate {
            reason: reason.into(),
        }
    }

    pub fn encode(reason: impl Into<String>) -> Self {
        Error::Encode(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_lists_every_column() {
        let err = Error::MissingColumns {
            missing: vec!["BARCODE".to_string(), "TOTAL".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("BARCODE, TOTAL"));
        assert_eq!(err.class(), ErrorClass::Configuration);
    }

    #[test]
    fn test_record_errors_are_record_scoped() {
        let err = Error::UnsupportedBarcodeChar {
            ch: 'é',
            position: 3,
        };
        assert!(err.is_record_scoped());
        assert!(err.to_string().contains("position 3"));

        let overflow = Error::LayoutOverflow {
            section: "static".to_string(),
            needed: 990,
            available: 960,
        };
        assert!(overflow.is_record_scoped());
    }

    #[test]
    fn test_io_errors_abort() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        assert_eq!(err.class(), ErrorClass::Resource);
        assert!(!err.is_record_scoped());
    }
}
