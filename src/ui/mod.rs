//! Terminal output: progress while executing, the report afterwards

mod progress;
mod report;

pub use progress::ProgressReporter;
pub use report::{render_console_report, ReportOptions};
