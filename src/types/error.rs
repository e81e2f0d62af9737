//! Error types for rerooter

use std::path::PathBuf;
use thiserror::Error;

/// Error types for rerooter operations
#[derive(Debug, Error)]
pub enum RerootError {
    /// Filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unusable configuration file or value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input that fails a precondition (e.g. a root that is not a directory)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Glob or ignore pattern that cannot be compiled
    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// Structured reference that does not resolve to a planned file (strict policy)
    #[error("orphan project reference in {}: {reference} (not found in source map)", file.display())]
    OrphanReference { file: PathBuf, reference: String },

    /// Text that cannot be represented in the chosen encoding
    #[error("Cannot encode {} as {encoding}", path.display())]
    Encoding { path: PathBuf, encoding: String },

    /// External verification could not be started
    #[error("Verification error: {0}")]
    Verification(String),
}

impl RerootError {
    /// Errors that abort the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RerootError::Config(_)
                | RerootError::Validation(_)
                | RerootError::Pattern { .. }
                | RerootError::OrphanReference { .. }
        )
    }
}
