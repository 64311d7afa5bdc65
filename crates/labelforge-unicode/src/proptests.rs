// this_file: crates/labelforge-unicode/src/proptests.rs

use super::*;
use proptest::prelude::*;

const MIXED_LINE: &str =
    "[a-zA-Z0-9 :.,]{0,8}[\u{0621}-\u{063A}\u{0641}-\u{064A}][\u{0621}-\u{063A}\u{0641}-\u{064A}a-z0-9 .:]{0,24}";

fn capabilities() -> impl Strategy<Value = ShapingCapability> {
    prop_oneof![Just(ShapingCapability::Full), Just(ShapingCapability::BidiOnly)]
}

// Property: a shaped line handed back to the shaper is returned unchanged
proptest! {
    #[test]
    fn prop_shaping_shaped_lines_is_a_no_op(line in MIXED_LINE, capability in capabilities()) {
        let shaper = TextShaper::new(capability);
        let once = shaper.shape(line.as_str());
        prop_assert_eq!(once.direction, labelforge_core::Direction::RightToLeft);
        let twice = shaper.shape(&once);
        prop_assert_eq!(&twice, &once);
    }
}

// Property: joined output is recognised as visual even as a plain string
#[cfg(feature = "arabic-reshaping")]
proptest! {
    #[test]
    fn prop_joined_text_is_a_fixed_point(line in MIXED_LINE) {
        let shaper = TextShaper::new(ShapingCapability::Full);
        let once = shaper.shape(line.as_str());
        prop_assert_eq!(once.outcome, ShapeOutcome::Shaped);
        let twice = shaper.shape(once.text.as_str());
        prop_assert_eq!(twice.outcome, ShapeOutcome::AlreadyVisual);
        prop_assert_eq!(twice.text, once.text);
    }
}

// Property: shaping is a pure function of its input
proptest! {
    #[test]
    fn prop_shape_is_deterministic(line in "\\PC{0,32}", capability in capabilities()) {
        let shaper = TextShaper::new(capability);
        prop_assert_eq!(shaper.shape(line.as_str()), shaper.shape(line.as_str()));
    }
}
