// this_file: fuzz/fuzz_targets/shape.rs

#![no_main]

use labelforge_unicode::{ShapingCapability, TextShaper};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|text: &str| {
    for capability in [ShapingCapability::Full, ShapingCapability::BidiOnly] {
        let shaper = TextShaper::new(capability);
        let first = shaper.shape(text);
        assert_eq!(first, shaper.shape(text));
        assert_eq!(shaper.shape(&first), first);
    }
});
