// this_file: crates/labelforge-barcode/src/symbol.rs

//! Module rows, fitting into layout regions and scanning rasterised rows.

use crate::code128::{decode_values, pattern, PATTERNS, STOP_PATTERN};
use labelforge_core::{Error, RenderSurface, Result};

/// An encoded symbol as a row of modules (`true` = dark), quiet zones included.
///
/// The row is independent of final placement; see [`SymbolImage::fit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolImage {
    value: String,
    modules: Vec<bool>,
    quiet_zone: u32,
}

/// Integer scaling of a symbol into a layout region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaledSymbol {
    /// Pixels per module
    pub module_width: u32,
    /// Horizontal offset of the first module inside the region
    pub offset_x: u32,
    /// Total symbol width in pixels
    pub width: u32,
    pub height: u32,
}

impl SymbolImage {
    pub(crate) fn from_values(value: &str, values: &[u8], quiet_zone: u32) -> Self {
        let quiet = quiet_zone as usize;
        let mut modules = Vec::with_capacity(values.len() * 11 + 2 + quiet * 2);
        modules.resize(quiet, false);
        for &code in values {
            for (index, width) in pattern(code).iter().enumerate() {
                let dark = index % 2 == 0;
                modules.extend(std::iter::repeat(dark).take((width - b'0') as usize));
            }
        }
        modules.resize(modules.len() + quiet, false);

        Self {
            value: value.to_string(),
            modules,
            quiet_zone,
        }
    }

    /// The encoded text.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn modules(&self) -> &[bool] {
        &self.modules
    }

    /// Module count, quiet zones included.
    pub fn module_count(&self) -> u32 {
        self.modules.len() as u32
    }

    pub fn quiet_zone(&self) -> u32 {
        self.quiet_zone
    }

    /// Dark bars as `(first_module, module_count)` runs.
    pub fn bars(&self) -> Vec<(u32, u32)> {
        let mut bars = Vec::new();
        let mut start = None;
        for (index, &dark) in self.modules.iter().enumerate() {
            match (dark, start) {
                (true, None) => start = Some(index),
                (false, Some(first)) => {
                    bars.push((first as u32, (index - first) as u32));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(first) = start {
            bars.push((first as u32, (self.modules.len() - first) as u32));
        }
        bars
    }

    /// Scale into a `region_width` x `region_height` box without distorting
    /// bar ratios: every module gets the same integer pixel width.
    pub fn fit(
        &self,
        region_width: u32,
        region_height: u32,
        min_module_width: u32,
    ) -> Result<ScaledSymbol> {
        let modules = self.module_count();
        let module_width = region_width / modules.max(1);
        if module_width < min_module_width.max(1) {
            return Err(Error::SymbolTooSmall {
                modules,
                min_module_width,
                needed: modules.saturating_mul(min_module_width.max(1)),
                available: region_width,
            });
        }
        let width = module_width * modules;
        Ok(ScaledSymbol {
            module_width,
            offset_x: (region_width - width) / 2,
            width,
            height: region_height,
        })
    }

    /// Standalone grayscale raster of the symbol.
    pub fn to_surface(&self, module_width: u32, height: u32) -> RenderSurface {
        let module_width = module_width.max(1);
        let mut row = Vec::with_capacity(self.modules.len() * module_width as usize);
        for &dark in &self.modules {
            let shade = if dark { 0u8 } else { 255u8 };
            row.extend(std::iter::repeat(shade).take(module_width as usize));
        }
        let width = row.len() as u32;
        let data = row.repeat(height as usize);
        RenderSurface::from_gray(width, height, data)
    }
}

fn scan_error(reason: impl Into<String>) -> Error {
    Error::SymbolDecode {
        reason: reason.into(),
    }
}

/// Decode one horizontal row of pixels (`true` = dark) crossing a symbol.
///
/// Light pixels before the first bar and after the last are ignored. The
/// module width is estimated from the start character, which always spans
/// eleven modules.
pub fn scan_row(row: &[bool]) -> Result<String> {
    let first = row
        .iter()
        .position(|&dark| dark)
        .ok_or_else(|| scan_error("row contains no bars"))?;
    let last = row
        .iter()
        .rposition(|&dark| dark)
        .ok_or_else(|| scan_error("row contains no bars"))?;

    let mut runs: Vec<u32> = Vec::new();
    let mut current = row[first];
    let mut length = 0u32;
    for &dark in &row[first..=last] {
        if dark == current {
            length += 1;
        } else {
            runs.push(length);
            current = dark;
            length = 1;
        }
    }
    runs.push(length);

    // start + checksum + stop
    if runs.len() < 6 + 6 + STOP_PATTERN.len() || (runs.len() - STOP_PATTERN.len()) % 6 != 0 {
        return Err(scan_error(format!(
            "{} bar/space runs do not form whole characters",
            runs.len()
        )));
    }

    let module = runs[..6].iter().sum::<u32>() as f32 / 11.0;
    if module < 1.0 {
        return Err(scan_error("module width below one pixel"));
    }
    let widths = runs
        .iter()
        .map(|&run| {
            let modules = (run as f32 / module).round() as u32;
            if (1..=4).contains(&modules) {
                Ok(b'0' + modules as u8)
            } else {
                Err(scan_error(format!("run of {run}px is not 1-4 modules")))
            }
        })
        .collect::<Result<Vec<u8>>>()?;

    let (data, stop) = widths.split_at(widths.len() - STOP_PATTERN.len());
    if stop != STOP_PATTERN {
        return Err(scan_error("missing stop pattern"));
    }

    let mut values = Vec::with_capacity(data.len() / 6 + 1);
    for chunk in data.chunks_exact(6) {
        let value = PATTERNS
            .iter()
            .position(|pattern| pattern.as_slice() == chunk)
            .ok_or_else(|| scan_error("unknown character pattern"))?;
        values.push(value as u8);
    }
    values.push(crate::code128::STOP);

    decode_values(&values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BarcodeEncoder;

    fn rasterise(symbol: &SymbolImage, scaled: &ScaledSymbol, region_width: u32) -> Vec<bool> {
        let mut row = vec![false; region_width as usize];
        for (first, count) in symbol.bars() {
            let start = scaled.offset_x + first * scaled.module_width;
            let end = start + count * scaled.module_width;
            row[start as usize..end as usize].fill(true);
        }
        row
    }

    #[test]
    fn test_fit_uses_integer_module_width_and_centres() {
        let symbol = BarcodeEncoder::default().encode("1234567890").unwrap();
        // 8 values: 7 * 11 + 13 = 90 modules, plus 2 * 10 quiet
        assert_eq!(symbol.module_count(), 110);
        let scaled = symbol.fit(490, 140, 2).unwrap();
        assert_eq!(scaled.module_width, 4);
        assert_eq!(scaled.width, 440);
        assert_eq!(scaled.offset_x, 25);
        assert_eq!(scaled.height, 140);
    }

    #[test]
    fn test_scaled_row_scans_back() {
        let symbol = BarcodeEncoder::default().encode("1234567890").unwrap();
        let scaled = symbol.fit(490, 140, 2).unwrap();
        let row = rasterise(&symbol, &scaled, 490);
        assert_eq!(scan_row(&row).unwrap(), "1234567890");
    }

    #[test]
    fn test_too_small_region_fails() {
        let symbol = BarcodeEncoder::default()
            .encode("THIS-IS-A-RATHER-LONG-IDENTIFIER-0001")
            .unwrap();
        let err = symbol.fit(200, 140, 2).unwrap_err();
        assert!(matches!(err, Error::SymbolTooSmall { available: 200, .. }));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_huge_minimum_module_width_saturates() {
        let symbol = BarcodeEncoder::default().encode("1234567890").unwrap();
        let err = symbol.fit(490, 140, u32::MAX).unwrap_err();
        assert!(matches!(
            err,
            Error::SymbolTooSmall {
                needed: u32::MAX,
                available: 490,
                ..
            }
        ));
    }

    #[test]
    fn test_blank_row_is_rejected() {
        assert!(scan_row(&[false; 64]).is_err());
    }

    #[test]
    fn test_surface_matches_module_row() {
        let symbol = BarcodeEncoder::new(2).encode("A").unwrap();
        let surface = symbol.to_surface(3, 5);
        assert_eq!(surface.width(), symbol.module_count() * 3);
        assert_eq!(surface.height(), 5);
    }
}
