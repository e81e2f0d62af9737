//! Directory scanning and path filtering

mod gitignore;
mod pattern;
mod walker;

pub use pattern::{compile_globs, glob_match, GlobPattern};
pub use gitignore::{GitIgnoreRule, IgnoreMatcher, IGNORE_FILE_NAME};
pub use walker::{collect_files, SourceFile};
