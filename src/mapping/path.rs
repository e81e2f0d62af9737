//! Relative path renaming
//!
//! Mappings are plain substring replacements applied in list order, each one
//! operating on the output of the previous. They are not segment-aware: a
//! `from` value of `lib` also rewrites `library`.

use crate::config::PathMapping;

/// `\` -> `/`
pub fn normalize_separators(value: &str) -> String {
    value.replace('\\', "/")
}

/// Compute a destination relative path from a source relative path.
///
/// With `reverse`, every mapping is applied `to` -> `from` instead, still in
/// list order. A mapping whose (normalized) search value is absent is a no-op.
pub fn apply_path_mappings(relative_path: &str, mappings: &[PathMapping], reverse: bool) -> String {
    let mut result = relative_path.to_string();
    for mapping in mappings {
        let (from_value, to_value) = if reverse {
            (&mapping.to_value, &mapping.from_value)
        } else {
            (&mapping.from_value, &mapping.to_value)
        };
        let from_value = normalize_separators(from_value);
        if from_value.is_empty() || !result.contains(&from_value) {
            continue;
        }
        result = result.replace(&from_value, &normalize_separators(to_value));
    }
    result
}
