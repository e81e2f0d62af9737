//! Progress reporting

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Instant;

/// Per-file progress bar for the execution phase
pub struct ProgressReporter {
    bar: ProgressBar,
    started_at: Option<Instant>,
    changed: usize,
}

impl ProgressReporter {
    /// Bar drawn on stderr.
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
        if let Ok(style) =
            ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} files | {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }

        Self {
            bar,
            started_at: None,
            changed: 0,
        }
    }

    /// Reporter that draws nothing (not a terminal, or summary output).
    pub fn hidden() -> Self {
        let reporter = Self::new();
        reporter.bar.set_draw_target(ProgressDrawTarget::hidden());
        reporter
    }

    /// Visible only when stderr is a terminal.
    pub fn for_terminal(enabled: bool) -> Self {
        if enabled && console::user_attended_stderr() {
            Self::new()
        } else {
            Self::hidden()
        }
    }

    pub fn start(&mut self, total_files: u64) {
        self.started_at = Some(Instant::now());
        self.changed = 0;
        self.bar.set_length(total_files);
        self.bar.set_position(0);
        self.bar.set_message("Processing...".to_string());
    }

    pub fn set_current_file(&self, path: &str) {
        self.bar.set_message(path.to_string());
    }

    pub fn complete_file(&mut self, changed: bool) {
        if changed {
            self.changed += 1;
        }
        self.bar.inc(1);
    }

    /// Print above the bar without tearing it.
    pub fn file_error(&self, path: &str, err: &str) {
        self.bar.println(format!("ERROR {}: {}", path, err));
    }

    pub fn finish(&self) {
        let elapsed = self
            .started_at
            .map(|started| started.elapsed().as_secs_f64())
            .unwrap_or_default();
        self.bar.finish_with_message(format!(
            "{} changed | {:.1}s",
            self.changed, elapsed
        ));
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}
