//! # rerooter - mirror a project tree under a new layout
//!
//! Copies a source tree into a destination tree while renaming paths and
//! rewriting file content, keeping solution and project references valid.
//! Edits made in the destination can be synced back the other way.

// Module declarations
pub mod config;
pub mod scanner;
pub mod mapping;
pub mod planner;
pub mod rewrite;
pub mod executor;
pub mod hash;
pub mod verify;
pub mod ui;
pub mod commands;
pub mod types;

// Re-export commonly used types
pub use config::AppConfig;
pub use planner::{build_sync_plan, SyncPlan};
pub use types::{FileAction, RerootError, SyncReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
