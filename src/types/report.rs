//! SyncReport - the terminal result of a run

use camino::Utf8PathBuf;
use chrono::{DateTime, Local};
use serde::Serialize;

/// Outcome for one planned file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileResult {
    pub source_rel: Utf8PathBuf,
    pub target_rel: Utf8PathBuf,

    /// Content differs from the destination (written unless dry-run)
    pub changed: bool,

    /// Generic substring replacements performed
    pub replacement_hits: usize,

    pub skipped_binary: bool,
}

/// Result of one external verification command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyResult {
    pub name: String,
    pub ok: bool,
    pub output: String,
}

impl VerifyResult {
    pub fn failed(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ok: false,
            output: output.into(),
        }
    }
}

/// Counters, diagnostics and per-file results of a sync run
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub started_at: DateTime<Local>,
    pub dry_run: bool,
    pub syncback: bool,

    /// Files in the plan (text and binary)
    pub scanned: usize,
    pub created_or_updated: usize,
    pub unchanged: usize,
    pub skipped_binary: usize,

    /// Binary files copied (or, in a dry run, that would be copied)
    pub binary_copied: usize,

    pub ignored_by_git: usize,
    pub replacement_hits: usize,

    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub file_results: Vec<FileResult>,
    pub verify_results: Vec<VerifyResult>,
}

impl SyncReport {
    pub fn new(dry_run: bool, syncback: bool) -> Self {
        Self {
            started_at: Local::now(),
            dry_run,
            syncback,
            scanned: 0,
            created_or_updated: 0,
            unchanged: 0,
            skipped_binary: 0,
            binary_copied: 0,
            ignored_by_git: 0,
            replacement_hits: 0,
            warnings: Vec::new(),
            errors: Vec::new(),
            file_results: Vec::new(),
            verify_results: Vec::new(),
        }
    }

    pub fn changed_files(&self) -> impl Iterator<Item = &FileResult> {
        self.file_results.iter().filter(|item| item.changed)
    }

    pub fn verification_failed(&self) -> bool {
        self.verify_results.iter().any(|result| !result.ok)
    }

    /// Process exit code: 1 for errors, 2 for failed verification, else 0
    pub fn exit_code(&self) -> u8 {
        if !self.errors.is_empty() {
            1
        } else if self.verification_failed() {
            2
        } else {
            0
        }
    }
}
