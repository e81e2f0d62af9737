//! Core type definitions for rerooter

mod action;
mod error;
mod report;

pub use action::FileAction;
pub use error::RerootError;
pub use report::{FileResult, SyncReport, VerifyResult};
