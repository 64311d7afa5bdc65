// this_file: crates/labelforge-unicode/src/shaper.rs

//! Arabic reshaping followed by bidi reordering.

use crate::direction::{classify_direction, is_base_arabic_letter, is_presentation_form};
use labelforge_core::Direction;
use log::debug;
use unicode_bidi::BidiInfo;

/// What the shaper can do at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapingCapability {
    /// Contextual joining plus bidi reordering
    Full,
    /// Bidi reordering only; Arabic letters stay in their isolated forms
    BidiOnly,
}

impl ShapingCapability {
    /// True when this build carries an Arabic reshaper.
    pub const fn reshaping_compiled() -> bool {
        cfg!(feature = "arabic-reshaping")
    }

    /// Combine the configured request with what this build supports.
    pub fn resolve(requested: bool) -> Self {
        if requested && Self::reshaping_compiled() {
            ShapingCapability::Full
        } else {
            ShapingCapability::BidiOnly
        }
    }

    pub fn is_degraded(self) -> bool {
        self == ShapingCapability::BidiOnly
    }
}

/// How a line came out of the shaper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeOutcome {
    /// Left-to-right line, passed through untouched
    Identity,
    /// Reshaped and reordered into visual order
    Shaped,
    /// Input was already in visual order with joined forms; returned unchanged
    AlreadyVisual,
    /// Reordered without reshaping because reshaping is unavailable
    Degraded,
}

/// A line ready for left-to-right rasterisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapedLine {
    pub text: String,
    pub direction: Direction,
    pub outcome: ShapeOutcome,
}

impl ShapedLine {
    pub fn is_degraded(&self) -> bool {
        self.outcome == ShapeOutcome::Degraded
    }
}

/// Stateless line shaper.
///
/// `shape` is a pure function of its input and the capability fixed at
/// construction.
#[derive(Debug, Clone, Copy)]
pub struct TextShaper {
    capability: ShapingCapability,
}

impl Default for TextShaper {
    fn default() -> Self {
        Self::new(ShapingCapability::resolve(true))
    }
}

impl TextShaper {
    pub fn new(capability: ShapingCapability) -> Self {
        let capability = if ShapingCapability::reshaping_compiled() {
            capability
        } else {
            if capability == ShapingCapability::Full {
                debug!(
                    target: "labelforge::unicode",
                    "reshaping requested but not compiled in; using bidi reordering only"
                );
            }
            ShapingCapability::BidiOnly
        };
        Self { capability }
    }

    pub fn capability(&self) -> ShapingCapability {
        self.capability
    }

    /// Convert a line into visual order.
    ///
    /// Strings are taken as logical order. A [`ShapedLine`] is already visual
    /// and comes back unchanged, so shaping the output again is a no-op.
    pub fn shape<T: ShapeSource + ?Sized>(&self, input: &T) -> ShapedLine {
        input.shape_with(self)
    }

    fn shape_logical(&self, line: &str) -> ShapedLine {
        let direction = classify_direction(line);
        if !direction.is_rtl() {
            return ShapedLine {
                text: line.to_string(),
                direction,
                outcome: ShapeOutcome::Identity,
            };
        }

        if is_already_visual(line) {
            return ShapedLine {
                text: line.to_string(),
                direction,
                outcome: ShapeOutcome::AlreadyVisual,
            };
        }

        let (text, outcome) = match self.capability {
            ShapingCapability::Full => {
                let text = reorder(&reshape(line));
                let unjoined = text.chars().filter(|&ch| is_base_arabic_letter(ch)).count();
                if unjoined > 0 {
                    debug!(
                        target: "labelforge::unicode",
                        "{unjoined} letter(s) in {line:?} have no joined forms"
                    );
                }
                (text, ShapeOutcome::Shaped)
            }
            ShapingCapability::BidiOnly => (reorder(line), ShapeOutcome::Degraded),
        };
        ShapedLine {
            text,
            direction,
            outcome,
        }
    }
}

/// Input accepted by [`TextShaper::shape`].
pub trait ShapeSource {
    fn shape_with(&self, shaper: &TextShaper) -> ShapedLine;
}

impl ShapeSource for str {
    fn shape_with(&self, shaper: &TextShaper) -> ShapedLine {
        shaper.shape_logical(self)
    }
}

impl ShapeSource for String {
    fn shape_with(&self, shaper: &TextShaper) -> ShapedLine {
        shaper.shape_logical(self)
    }
}

impl ShapeSource for ShapedLine {
    fn shape_with(&self, _shaper: &TextShaper) -> ShapedLine {
        self.clone()
    }
}

impl<T: ShapeSource + ?Sized> ShapeSource for &T {
    fn shape_with(&self, shaper: &TextShaper) -> ShapedLine {
        (**self).shape_with(shaper)
    }
}

/// Any joined presentation form marks a line as shaped output.
///
/// Letters the reshaper has no forms for stay as base letters next to joined
/// ones, so base letters alone do not mean the line is logical.
fn is_already_visual(line: &str) -> bool {
    line.chars().any(is_presentation_form)
}

#[cfg(feature = "arabic-reshaping")]
fn reshape(line: &str) -> String {
    use ar_reshaper::{ArabicReshaper, ReshaperConfig};

    ArabicReshaper::new(ReshaperConfig::default()).reshape(line)
}

#[cfg(not(feature = "arabic-reshaping"))]
fn reshape(line: &str) -> String {
    line.to_string()
}

/// Apply the bidi algorithm paragraph by paragraph.
fn reorder(text: &str) -> String {
    let info = BidiInfo::new(text, None);
    let mut visual = String::with_capacity(text.len());
    for paragraph in &info.paragraphs {
        let line = paragraph.range.clone();
        visual.push_str(&info.reorder_line(paragraph, line));
    }
    visual
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ltr_lines_are_identity() {
        let shaper = TextShaper::default();
        let shaped = shaper.shape("Model : A1");
        assert_eq!(shaped.text, "Model : A1");
        assert_eq!(shaped.outcome, ShapeOutcome::Identity);
        assert_eq!(shaper.shape("").outcome, ShapeOutcome::Identity);
    }

    #[test]
    fn test_degraded_mode_reorders_without_joining() {
        let shaper = TextShaper::new(ShapingCapability::BidiOnly);
        let shaped = shaper.shape("\u{0628}\u{064A}");
        assert_eq!(shaped.text, "\u{064A}\u{0628}");
        assert!(shaped.is_degraded());
        assert_eq!(shaped.direction, Direction::RightToLeft);
    }

    #[test]
    fn test_numbers_keep_their_order_inside_rtl_lines() {
        let shaper = TextShaper::new(ShapingCapability::BidiOnly);
        let shaped = shaper.shape("ص.ب 86003 الرياض");
        assert!(shaped.text.contains("86003"));
    }

    #[test]
    fn test_shape_is_deterministic() {
        let shaper = TextShaper::default();
        let line = "المستورد: شركة ريتيل كارت للتجارة";
        assert_eq!(shaper.shape(line), shaper.shape(line));
    }

    #[cfg(feature = "arabic-reshaping")]
    #[test]
    fn test_full_shaping_joins_letters() {
        let shaper = TextShaper::new(ShapingCapability::Full);
        let shaped = shaper.shape("سلام");
        assert_eq!(shaped.outcome, ShapeOutcome::Shaped);
        assert!(!shaped.text.chars().any(is_base_arabic_letter));
        assert!(shaped.text.chars().any(is_presentation_form));
    }

    #[cfg(feature = "arabic-reshaping")]
    #[test]
    fn test_reshaping_visual_output_is_a_no_op() {
        let shaper = TextShaper::new(ShapingCapability::Full);
        for line in [
            "الموزع: ستايلي للتجارة ذ.م.م",
            "ص.ب رقم 25030 دبي، الإمارات العربية المتحدة",
        ] {
            let once = shaper.shape(line);
            let twice = shaper.shape(&once.text);
            assert_eq!(twice.outcome, ShapeOutcome::AlreadyVisual);
            assert_eq!(twice.text, once.text);
        }
    }

    #[cfg(feature = "arabic-reshaping")]
    #[test]
    fn test_unmapped_letters_do_not_trigger_a_second_pass() {
        let shaper = TextShaper::new(ShapingCapability::Full);
        // U+063B has no presentation forms and survives reshaping as a base letter
        let once = shaper.shape("abc \u{0628}\u{063B}\u{0627}");
        assert!(once.text.chars().any(is_base_arabic_letter));
        let twice = shaper.shape(once.text.as_str());
        assert_eq!(twice.outcome, ShapeOutcome::AlreadyVisual);
        assert_eq!(twice.text, once.text);
    }

    #[test]
    fn test_shaped_lines_pass_through_unchanged() {
        for capability in [ShapingCapability::Full, ShapingCapability::BidiOnly] {
            let shaper = TextShaper::new(capability);
            let once = shaper.shape("المستورد: شركة ريتيل");
            assert_ne!(once.text, "المستورد: شركة ريتيل");
            let twice = shaper.shape(&once);
            assert_eq!(twice, once);
            assert_eq!(shaper.shape(&twice), once);
        }
    }

    #[test]
    fn test_capability_without_request_is_bidi_only() {
        assert_eq!(ShapingCapability::resolve(false), ShapingCapability::BidiOnly);
        assert!(ShapingCapability::resolve(false).is_degraded());
    }
}
