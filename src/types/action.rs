//! FileAction - one planned file transformation

use crate::config::Replacement;
use camino::Utf8PathBuf;
use std::path::PathBuf;

/// One included source file and where it goes
///
/// Created once by the planner, consumed once by the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAction {
    pub source_abs: PathBuf,
    pub source_rel: Utf8PathBuf,
    pub target_abs: PathBuf,
    pub target_rel: Utf8PathBuf,

    /// Binary files are copied byte-for-byte and never substituted
    pub is_binary: bool,

    /// Ordered, de-duplicated, never an empty `from`; empty for binary files
    pub replacements: Vec<Replacement>,

    /// Syncback only: the forward list, set when one of its replacements has
    /// an empty `to` and was left out of `replacements`
    pub forward_replacements: Option<Vec<Replacement>>,
}

impl FileAction {
    /// Lowercase extension of the planned target, with its dot
    pub fn target_extension(&self) -> String {
        crate::mapping::lowercase_extension(&self.target_rel)
    }
}
