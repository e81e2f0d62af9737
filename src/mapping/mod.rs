//! Path renames and content replacement selection

mod content;
mod path;

pub use content::{mapping_replacements, merge_replacements, select_replacements, CompiledRule};
pub use path::{apply_path_mappings, normalize_separators};

use camino::Utf8Path;

/// Lowercase extension with its leading dot, or an empty string.
///
/// Dotfiles such as `.gitignore` have no extension.
pub fn lowercase_extension(path: &Utf8Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}
