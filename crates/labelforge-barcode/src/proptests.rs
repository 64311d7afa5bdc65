// this_file: crates/labelforge-barcode/src/proptests.rs

use super::*;
use proptest::prelude::*;

fn rasterise(symbol: &SymbolImage, scaled: &ScaledSymbol, region_width: u32) -> Vec<bool> {
    let mut row = vec![false; region_width as usize];
    for (first, count) in symbol.bars() {
        let start = scaled.offset_x + first * scaled.module_width;
        let end = start + count * scaled.module_width;
        row[start as usize..end as usize].fill(true);
    }
    row
}

// Property: any ASCII value survives encode, fit, rasterise and scan
proptest! {
    #[test]
    fn prop_ascii_value_scans_back(bytes in proptest::collection::vec(0u8..128, 1..48)) {
        let value: String = bytes.iter().map(|&b| b as char).collect();
        let symbol = BarcodeEncoder::default().encode(&value).unwrap();

        // Leave slack so the symbol is centred at a non-zero offset
        let region_width = symbol.module_count() * 3 + 7;
        let scaled = symbol.fit(region_width, 140, 2).unwrap();
        prop_assert_eq!(scaled.module_width, 3);

        let row = rasterise(&symbol, &scaled, region_width);
        prop_assert_eq!(scan_row(&row).unwrap(), value.clone());
        prop_assert_eq!(decode(&symbol).unwrap(), value);
    }
}

// Property: non-ASCII input is refused rather than mis-encoded
proptest! {
    #[test]
    fn prop_non_ascii_is_rejected(prefix in "[ -~]{0,8}", c in "[^\\x00-\\x7f]") {
        let value = format!("{prefix}{c}");
        prop_assert!(BarcodeEncoder::default().encode(&value).is_err());
    }
}
