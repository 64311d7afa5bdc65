// this_file: fuzz/fuzz_targets/scan_row.rs

#![no_main]

use labelforge_barcode::{scan_row, BarcodeEncoder};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // arbitrary rows must be rejected, never panic
    let row: Vec<bool> = data.iter().map(|byte| byte & 1 == 1).collect();
    let _ = scan_row(&row);

    // anything we can encode must scan back unchanged
    if let Ok(value) = std::str::from_utf8(data) {
        if let Ok(symbol) = BarcodeEncoder::default().encode(value) {
            assert_eq!(scan_row(symbol.modules()).ok().as_deref(), Some(value));
        }
    }
});
