//! Console rendering of a finished [`SyncReport`]

use crate::config::LogLevel;
use crate::types::SyncReport;
use console::Style;

/// Changed/unchanged files listed before the list is cut short
const LIST_LIMIT: usize = 50;

/// How a report is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub dry_run: bool,
    pub use_color: bool,
    pub level: LogLevel,
}

struct Theme {
    enabled: bool,
}

impl Theme {
    fn paint(&self, style: Style, text: String) -> String {
        if self.enabled {
            style.force_styling(true).apply_to(text).to_string()
        } else {
            text
        }
    }

    fn title(&self, text: String) -> String {
        self.paint(Style::new().cyan().bold(), text)
    }

    fn section(&self, text: &str) -> String {
        self.paint(Style::new().magenta().bold(), text.to_string())
    }

    fn success(&self, text: String) -> String {
        self.paint(Style::new().green(), text)
    }

    fn warn(&self, text: String) -> String {
        self.paint(Style::new().yellow(), text)
    }

    fn error(&self, text: String) -> String {
        self.paint(Style::new().red(), text)
    }
}

/// Render the report as console text (no trailing newline).
pub fn render_console_report(report: &SyncReport, options: &ReportOptions) -> String {
    let theme = Theme {
        enabled: options.use_color,
    };
    let level = options.level;
    let mode = if options.dry_run { "DRY-RUN" } else { "APPLY" };
    let direction = if report.syncback { " | SYNCBACK" } else { "" };

    let mut lines = vec![theme.title(format!(
        "rerooter | {mode}{direction} | LOG={}",
        level.as_str().to_uppercase()
    ))];

    lines.push(theme.section("Summary"));
    lines.push(format!("  • scanned files       : {}", report.scanned));
    lines.push(format!("  • changed files       : {}", report.created_or_updated));
    lines.push(format!("  • unchanged files     : {}", report.unchanged));
    lines.push(format!("  • gitignored skipped  : {}", report.ignored_by_git));
    lines.push(format!("  • binary skipped      : {}", report.skipped_binary));
    lines.push(format!("  • binary copied       : {}", report.binary_copied));
    lines.push(format!("  • replacement hits    : {}", report.replacement_hits));

    let changed: Vec<_> = report.changed_files().collect();
    if !changed.is_empty() && level >= LogLevel::Normal {
        lines.push(theme.section("Changed Files"));
        let shown = if level == LogLevel::Debug {
            changed.len()
        } else {
            changed.len().min(LIST_LIMIT)
        };
        for item in &changed[..shown] {
            lines.push(theme.success(format!(
                "  + {} -> {} (hits={})",
                item.source_rel, item.target_rel, item.replacement_hits
            )));
        }
        if changed.len() > shown {
            lines.push(format!("  ... {} more changed files", changed.len() - shown));
        }
    }

    if level == LogLevel::Debug {
        let unchanged: Vec<_> = report
            .file_results
            .iter()
            .filter(|item| !item.changed && !item.skipped_binary)
            .collect();
        if !unchanged.is_empty() {
            lines.push(theme.section("Debug Unchanged"));
            for item in unchanged.iter().take(LIST_LIMIT) {
                lines.push(format!("  = {} -> {}", item.source_rel, item.target_rel));
            }
            if unchanged.len() > LIST_LIMIT {
                lines.push(format!(
                    "  ... {} more unchanged files",
                    unchanged.len() - LIST_LIMIT
                ));
            }
        }
    }

    if !report.warnings.is_empty() {
        lines.push(theme.section("Warnings"));
        for message in &report.warnings {
            lines.push(theme.warn(format!("  ! {message}")));
        }
    }

    if !report.errors.is_empty() {
        lines.push(theme.section("Errors"));
        for message in &report.errors {
            lines.push(theme.error(format!("  x {message}")));
        }
    }

    if !report.verify_results.is_empty() {
        lines.push(theme.section("Verification"));
        for result in &report.verify_results {
            let line = format!(
                "  • {}: {}",
                result.name,
                if result.ok { "OK" } else { "FAILED" }
            );
            lines.push(if result.ok {
                theme.success(line)
            } else {
                theme.error(line)
            });
            if !result.output.trim().is_empty() {
                lines.push(format!("    {}", result.output.trim()));
            }
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FileResult, VerifyResult};

    fn options(level: LogLevel) -> ReportOptions {
        ReportOptions {
            dry_run: true,
            use_color: false,
            level,
        }
    }

    fn result(name: &str, changed: bool) -> FileResult {
        FileResult {
            source_rel: name.into(),
            target_rel: name.replace("Old", "New").into(),
            changed,
            replacement_hits: usize::from(changed),
            skipped_binary: false,
        }
    }

    fn sample_report(changed: usize) -> SyncReport {
        let mut report = SyncReport::new(true, false);
        for i in 0..changed {
            report.file_results.push(result(&format!("Old/file{i}.cs"), true));
        }
        report.file_results.push(result("Old/same.cs", false));
        report.scanned = changed + 1;
        report.created_or_updated = changed;
        report.unchanged = 1;
        report
    }

    #[test]
    fn test_summary_level_hides_file_lists() {
        let text = render_console_report(&sample_report(2), &options(LogLevel::Summary));
        assert!(text.starts_with("rerooter | DRY-RUN | LOG=SUMMARY"));
        assert!(text.contains("  • changed files       : 2"));
        assert!(!text.contains("Changed Files"));
        assert!(!text.contains("Debug Unchanged"));
    }

    #[test]
    fn test_normal_level_truncates_changed_files() {
        let text = render_console_report(&sample_report(55), &options(LogLevel::Normal));
        assert!(text.contains("Changed Files"));
        assert!(text.contains("  + Old/file0.cs -> New/file0.cs (hits=1)"));
        assert!(text.contains("  ... 5 more changed files"));
        assert!(!text.contains("Debug Unchanged"));
    }

    #[test]
    fn test_debug_level_lists_everything() {
        let text = render_console_report(&sample_report(55), &options(LogLevel::Debug));
        assert!(text.contains("  + Old/file54.cs -> New/file54.cs (hits=1)"));
        assert!(!text.contains("more changed files"));
        assert!(text.contains("Debug Unchanged"));
        assert!(text.contains("  = Old/same.cs -> New/same.cs"));
    }

    #[test]
    fn test_diagnostics_and_verification_sections() {
        let mut report = sample_report(0);
        report.warnings.push("orphan project reference in /src/App.sln: x.csproj (not found in source map)".to_string());
        report.errors.push("write failed for /dst/a.txt".to_string());
        report.verify_results.push(VerifyResult::failed("dotnet build App.sln", "  error CS0246  "));

        let text = render_console_report(&report, &options(LogLevel::Summary));
        assert!(text.contains("Warnings\n  ! orphan project reference"));
        assert!(text.contains("Errors\n  x write failed for /dst/a.txt"));
        assert!(text.contains("  • dotnet build App.sln: FAILED\n    error CS0246"));
    }

    #[test]
    fn test_color_is_explicit() {
        let plain = render_console_report(&sample_report(1), &options(LogLevel::Normal));
        assert!(!plain.contains('\u{1b}'));

        let colored = render_console_report(
            &sample_report(1),
            &ReportOptions {
                use_color: true,
                ..options(LogLevel::Normal)
            },
        );
        assert!(colored.contains('\u{1b}'));
        assert!(colored.contains("APPLY") || colored.contains("DRY-RUN"));
    }
}
