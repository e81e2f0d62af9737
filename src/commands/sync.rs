//! Main sync command

use crate::config::AppConfig;
use crate::executor::{execute_plan_with, ExecutionEvent};
use crate::planner::{build_sync_plan, SyncPlan};
use crate::types::{RerootError, SyncReport};
use crate::ui::ProgressReporter;
use crate::verify::{ProcessRunner, VerificationRunner};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Run-level switches that are not part of the configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    pub dry_run: bool,

    /// Sync the destination tree back into the source tree
    pub syncback: bool,

    /// Draw a progress bar on stderr (only if it is a terminal)
    pub show_progress: bool,
}

/// Plan and execute one run between `source_root` and `dest_root`.
///
/// Roots are always given in forward orientation; with `syncback` the
/// destination is walked and the source is written.
pub fn run(
    source_root: &Path,
    dest_root: &Path,
    config: &AppConfig,
    options: SyncOptions,
) -> Result<SyncReport, RerootError> {
    let runner = ProcessRunner::from_options(&config.verify);
    run_with(source_root, dest_root, config, options, &runner)
}

/// [`run`] with an explicit verification runner.
pub fn run_with(
    source_root: &Path,
    dest_root: &Path,
    config: &AppConfig,
    options: SyncOptions,
    runner: &dyn VerificationRunner,
) -> Result<SyncReport, RerootError> {
    info!("Planning file actions...");
    let plan = plan_for(source_root, dest_root, config, options.syncback)?;
    info!("{}", format_plan_preview(&plan, options.dry_run));

    let reporter = Arc::new(Mutex::new(ProgressReporter::for_terminal(
        options.show_progress,
    )));
    if let Ok(mut progress) = reporter.lock() {
        progress.start(plan.len() as u64);
    }

    let progress_cb = {
        let reporter = Arc::clone(&reporter);
        move |event: &ExecutionEvent| match event {
            ExecutionEvent::FileStart { path, .. } => {
                if let Ok(progress) = reporter.lock() {
                    progress.set_current_file(path.as_str());
                }
            }
            ExecutionEvent::FileDone { changed, .. } => {
                if let Ok(mut progress) = reporter.lock() {
                    progress.complete_file(*changed);
                }
            }
            ExecutionEvent::FileError { path, message, .. } => {
                if let Ok(mut progress) = reporter.lock() {
                    progress.file_error(path.as_str(), message);
                    progress.complete_file(false);
                }
            }
            ExecutionEvent::Complete { .. } => {
                if let Ok(progress) = reporter.lock() {
                    progress.finish();
                }
            }
        }
    };

    execute_plan_with(&plan, config, options.dry_run, runner, Some(&progress_cb))
}

/// Forward plans walk the source; syncback plans walk the destination.
pub fn plan_for(
    source_root: &Path,
    dest_root: &Path,
    config: &AppConfig,
    syncback: bool,
) -> Result<SyncPlan, RerootError> {
    if syncback {
        build_sync_plan(dest_root, source_root, config, true)
    } else {
        build_sync_plan(source_root, dest_root, config, false)
    }
}

fn format_plan_preview(plan: &SyncPlan, dry_run: bool) -> String {
    let text = plan.len() - plan.skipped_binary.len();
    format!(
        "{} {} -> {}: {} text, {} binary",
        if dry_run { "Previewing" } else { "Syncing" },
        plan.source_root.display(),
        plan.target_root.display(),
        text,
        plan.skipped_binary.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathMapping;
    use crate::types::VerifyResult;
    use crate::verify::VerifyCommand;
    use std::fs;
    use tempfile::TempDir;

    struct PassingRunner;

    impl VerificationRunner for PassingRunner {
        fn run(&self, command: &VerifyCommand) -> VerifyResult {
            VerifyResult {
                name: command.name.clone(),
                ok: true,
                output: String::new(),
            }
        }
    }

    fn company_config() -> AppConfig {
        AppConfig {
            path_mappings: vec![PathMapping::new("OldCompany", "NewCompany")],
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_plan_for_swaps_roots_on_syncback() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        fs::create_dir_all(&src).expect("create src");
        fs::create_dir_all(dst.join("NewCompany")).expect("create dst");
        fs::write(dst.join("NewCompany/a.py"), "x = 1").expect("write");

        let plan = plan_for(&src, &dst, &company_config(), true).expect("plan");

        assert!(plan.reverse);
        assert_eq!(plan.source_root, dst);
        assert_eq!(plan.target_root, src);
        assert_eq!(plan.actions[0].target_rel.as_str(), "OldCompany/a.py");
    }

    #[test]
    fn test_run_forward_then_syncback_round_trips() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        fs::create_dir_all(src.join("OldCompany")).expect("create src");
        fs::write(src.join("OldCompany/a.py"), "import OldCompany\n").expect("write");

        let apply = SyncOptions::default();
        let forward =
            run_with(&src, &dst, &company_config(), apply, &PassingRunner).expect("forward");
        assert_eq!(forward.created_or_updated, 1);

        fs::write(dst.join("NewCompany/a.py"), "import NewCompany\nprint('edited')\n")
            .expect("edit destination");
        let back = run_with(
            &src,
            &dst,
            &company_config(),
            SyncOptions {
                syncback: true,
                ..apply
            },
            &PassingRunner,
        )
        .expect("syncback");

        assert!(back.syncback);
        assert_eq!(
            fs::read_to_string(src.join("OldCompany/a.py")).expect("read"),
            "import OldCompany\nprint('edited')\n"
        );
    }

    #[test]
    fn test_format_plan_preview() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp.path().join("a.txt"), "a").expect("write");
        fs::write(temp.path().join("b.bin"), [0u8, 1]).expect("write");
        let plan = plan_for(temp.path(), &temp.path().join("out"), &AppConfig::default(), false)
            .expect("plan");

        let preview = format_plan_preview(&plan, true);
        assert!(preview.starts_with("Previewing "));
        assert!(preview.ends_with(": 1 text, 1 binary"));
    }
}
