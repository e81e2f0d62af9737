//! Generic substring replacement

use crate::config::Replacement;
use std::ops::Range;

/// Apply every replacement in order; returns the new text and the number of
/// occurrences replaced. An empty `from` matches nothing.
pub fn apply_text_replacements(content: &str, replacements: &[Replacement]) -> (String, usize) {
    let mut updated = content.to_string();
    let mut total_hits = 0;
    for replacement in replacements {
        if replacement.from_value.is_empty() {
            continue;
        }
        let hits = updated.matches(replacement.from_value.as_str()).count();
        if hits > 0 {
            updated = updated.replace(&replacement.from_value, &replacement.to_value);
            total_hits += hits;
        }
    }
    (updated, total_hits)
}

/// Like [`apply_text_replacements`], but the byte ranges in `protected` are
/// copied through untouched. Ranges must be sorted and non-overlapping.
pub fn apply_replacements_outside(
    content: &str,
    replacements: &[Replacement],
    protected: &[Range<usize>],
) -> (String, usize) {
    if protected.is_empty() {
        return apply_text_replacements(content, replacements);
    }

    let mut output = String::with_capacity(content.len());
    let mut total_hits = 0;
    let mut cursor = 0;
    for span in protected {
        let (segment, hits) = apply_text_replacements(&content[cursor..span.start], replacements);
        output.push_str(&segment);
        output.push_str(&content[span.clone()]);
        total_hits += hits;
        cursor = span.end;
    }
    let (tail, hits) = apply_text_replacements(&content[cursor..], replacements);
    output.push_str(&tail);

    (output, total_hits + hits)
}
