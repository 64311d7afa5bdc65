// this_file: crates/labelforge-layout/src/fit.rs

//! Horizontal overflow policies.

use labelforge_core::OverflowPolicy;

/// Break or cut `text` so that each resulting line measures within `budget`.
///
/// Cuts only fall on code point boundaries. Wrapping is greedy on spaces;
/// a word wider than the budget is split between code points.
pub fn fit_line(
    text: &str,
    budget: f32,
    policy: OverflowPolicy,
    measure: impl Fn(&str) -> f32,
) -> Vec<String> {
    if measure(text) <= budget {
        return vec![text.to_string()];
    }
    match policy {
        OverflowPolicy::Truncate => vec![truncate(text, budget, &measure).to_string()],
        OverflowPolicy::Wrap => wrap(text, budget, &measure),
    }
}

fn truncate<'a>(text: &'a str, budget: f32, measure: &impl Fn(&str) -> f32) -> &'a str {
    let mut end = text.len();
    while end > 0 {
        end = text[..end]
            .char_indices()
            .next_back()
            .map(|(index, _)| index)
            .unwrap_or(0);
        let candidate = text[..end].trim_end();
        if measure(candidate) <= budget {
            return candidate;
        }
    }
    ""
}

fn wrap(text: &str, budget: f32, measure: &impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split(' ').filter(|word| !word.is_empty()) {
        if !current.is_empty() {
            let candidate = format!("{current} {word}");
            if measure(&candidate) <= budget {
                current = candidate;
                continue;
            }
            lines.push(std::mem::take(&mut current));
        }

        if measure(word) <= budget {
            current = word.to_string();
            continue;
        }

        // hard split, at least one code point per line
        let mut piece = String::new();
        for ch in word.chars() {
            piece.push(ch);
            if measure(&piece) > budget && piece.chars().count() > 1 {
                piece.pop();
                lines.push(std::mem::take(&mut piece));
                piece.push(ch);
            }
        }
        current = piece;
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
