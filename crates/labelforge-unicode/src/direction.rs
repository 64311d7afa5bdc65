// this_file: crates/labelforge-unicode/src/direction.rs

//! Direction classification and the tagged static text block.

use labelforge_core::Direction;

/// Arabic presentation forms A and B.
pub fn is_presentation_form(ch: char) -> bool {
    matches!(ch, '\u{FB50}'..='\u{FDFF}' | '\u{FE70}'..='\u{FEFF}')
}

/// Base (unjoined) Arabic letters that a reshaper would replace.
pub(crate) fn is_base_arabic_letter(ch: char) -> bool {
    matches!(ch, '\u{0620}'..='\u{064A}' | '\u{066E}'..='\u{06D3}' | '\u{06FA}'..='\u{06FC}')
        && ch != '\u{0640}'
}

/// A line is right-to-left as soon as it contains any Arabic code point.
pub fn classify_direction(text: &str) -> Direction {
    if text
        .chars()
        .any(|ch| matches!(ch, '\u{0600}'..='\u{06FF}') || is_presentation_form(ch))
    {
        Direction::RightToLeft
    } else {
        Direction::LeftToRight
    }
}

/// One static line tagged with its direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticLine {
    pub text: String,
    pub direction: Direction,
}

impl StaticLine {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let direction = classify_direction(&text);
        Self { text, direction }
    }

    /// Blank lines keep their vertical slot but draw nothing.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// The bilingual legal/contact block, tagged once at configuration time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticTextBlock {
    lines: Vec<StaticLine>,
}

impl StaticTextBlock {
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(StaticLine::new).collect(),
        }
    }

    pub fn lines(&self) -> &[StaticLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn rtl_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|line| line.direction.is_rtl())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_direction() {
        assert_eq!(classify_direction("PO Box 86003"), Direction::LeftToRight);
        assert_eq!(classify_direction("ص.ب 86003"), Direction::RightToLeft);
        assert_eq!(classify_direction("\u{FEDF}\u{FEE0}"), Direction::RightToLeft);
        assert_eq!(classify_direction(""), Direction::LeftToRight);
    }

    #[test]
    fn test_static_block_tags_each_line() {
        let block = StaticTextBlock::from_lines(["Importer: X", "", "المستورد: شركة"]);
        assert_eq!(block.len(), 3);
        assert_eq!(block.rtl_count(), 1);
        assert!(block.lines()[1].is_blank());
        assert_eq!(block.lines()[2].direction, Direction::RightToLeft);
    }

    #[test]
    fn test_tatweel_is_not_a_base_letter() {
        assert!(!is_base_arabic_letter('\u{0640}'));
        assert!(is_base_arabic_letter('\u{0628}'));
        assert!(!is_base_arabic_letter('\u{FE91}'));
    }
}
