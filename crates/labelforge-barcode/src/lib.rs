// this_file: crates/labelforge-barcode/src/lib.rs

//! Linear barcode support for labelforge.
//!
//! [`BarcodeEncoder`] turns an identifier into a [`SymbolImage`], a row of
//! light/dark modules with quiet zones that knows nothing about placement.
//! [`SymbolImage::fit`] scales it into a layout region at an integer module
//! width, and [`scan_row`] reads a rasterised row back into the original value.

pub mod code128;
pub mod symbol;

pub use code128::{checksum, decode_values, encode_values, CodeSet};
pub use symbol::{scan_row, ScaledSymbol, SymbolImage};

use labelforge_core::Result;

/// Light modules kept clear on each side of a symbol unless configured otherwise.
pub const DEFAULT_QUIET_ZONE: u32 = 10;

/// Code 128 encoder.
#[derive(Debug, Clone, Copy)]
pub struct BarcodeEncoder {
    quiet_zone_modules: u32,
}

impl Default for BarcodeEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_ZONE)
    }
}

impl BarcodeEncoder {
    pub fn new(quiet_zone_modules: u32) -> Self {
        Self { quiet_zone_modules }
    }

    /// Encode `value` into a checksum-protected symbol.
    ///
    /// Fails on empty input and on any character outside ASCII.
    pub fn encode(&self, value: &str) -> Result<SymbolImage> {
        let values = encode_values(value)?;
        log::trace!(
            target: "labelforge::barcode",
            "encoded {value:?} as {} code values",
            values.len()
        );
        Ok(SymbolImage::from_values(
            value,
            &values,
            self.quiet_zone_modules,
        ))
    }
}

/// Decode a symbol's module row back into its text.
pub fn decode(symbol: &SymbolImage) -> Result<String> {
    scan_row(symbol.modules())
}

#[cfg(test)]
mod proptests;
