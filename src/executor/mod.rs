//! Plan execution
//!
//! Walks a [`SyncPlan`] in order and brings every target up to date: text
//! files are decoded, structurally rewritten, substituted and re-encoded;
//! binary files are copied when their bytes differ. A target is only written
//! when its content changes, and never in a dry run. Per-file problems land in
//! the report; only configuration errors and strict orphans abort the run.

pub mod copy;
pub mod encoding;

pub use copy::{copy_file_atomic, write_bytes_atomic};
pub use encoding::{decode_bytes, encode_text, read_text, resolve_encodings, DecodedText};

use crate::config::{AppConfig, OrphanPolicy, Replacement};
use crate::hash::files_identical;
use crate::planner::SyncPlan;
use crate::rewrite::{
    apply_replacements_outside, apply_text_replacements, first_orphan, format_for,
    rewrite_references, AbsPathMap, RebaseContext,
};
use crate::types::{FileAction, FileResult, RerootError, SyncReport};
use crate::verify::{plan_verification, run_verification, ProcessRunner, VerificationRunner};
use camino::Utf8PathBuf;
use encoding_rs::Encoding;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

const PROGRESS_EVERY: usize = 100;

/// Events emitted while executing a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionEvent {
    /// A file is about to be processed.
    FileStart {
        index: usize,
        total: usize,
        path: Utf8PathBuf,
    },
    /// A file was processed; `changed` is true if it was (or would be) written.
    FileDone {
        index: usize,
        total: usize,
        path: Utf8PathBuf,
        changed: bool,
    },
    /// A file could not be written; the run continues.
    FileError {
        index: usize,
        total: usize,
        path: Utf8PathBuf,
        message: String,
    },
    /// Every file has been visited (verification may still follow).
    Complete { scanned: usize, changed: usize },
}

/// Optional callback used to receive execution events.
pub type ExecutionCallback = dyn Fn(&ExecutionEvent) + Send + Sync;

/// What happened to one file
enum Outcome {
    Synced { changed: bool, replacement_hits: usize },
    Skipped { warning: String },
    Failed { error: String },
}

/// Run-wide state shared by every file
struct RunContext<'a> {
    config: &'a AppConfig,
    encodings: Vec<&'static Encoding>,
    abs_map: AbsPathMap,
    dry_run: bool,
    reverse: bool,
}

/// Execute `plan` and verify the result with real processes.
pub fn execute_plan(
    plan: &SyncPlan,
    config: &AppConfig,
    dry_run: bool,
) -> Result<SyncReport, RerootError> {
    let runner = ProcessRunner::from_options(&config.verify);
    execute_plan_with(plan, config, dry_run, &runner, None)
}

/// Execute `plan` with an explicit verification runner and event callback.
pub fn execute_plan_with(
    plan: &SyncPlan,
    config: &AppConfig,
    dry_run: bool,
    runner: &dyn VerificationRunner,
    on_event: Option<&ExecutionCallback>,
) -> Result<SyncReport, RerootError> {
    let ctx = RunContext {
        config,
        encodings: resolve_encodings(&config.encodings)?,
        abs_map: AbsPathMap::from_plan(plan),
        dry_run,
        reverse: plan.reverse,
    };

    if config.sln.orphan_policy == OrphanPolicy::Strict {
        preflight_orphans(plan, &ctx)?;
    }

    let mut report = SyncReport::new(dry_run, plan.reverse);
    report.scanned = plan.len();
    report.skipped_binary = plan.skipped_binary.len();
    report.ignored_by_git = plan.ignored_by_git.len();

    let total = plan.len();
    for (idx, action) in plan.actions.iter().enumerate() {
        let index = idx + 1;
        if index % PROGRESS_EVERY == 0 || index == total {
            debug!("Processing {}/{}", index, total);
        }
        emit_event(
            on_event,
            ExecutionEvent::FileStart {
                index,
                total,
                path: action.source_rel.clone(),
            },
        );

        let outcome = if action.is_binary {
            sync_binary(action, &ctx)
        } else {
            match sync_text(action, &ctx, &mut report.warnings) {
                Ok(outcome) => outcome,
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => Outcome::Failed {
                    error: format!("sync failed for {}: {}", action.source_abs.display(), err),
                },
            }
        };

        match outcome {
            Outcome::Synced {
                changed,
                replacement_hits,
            } => {
                if action.is_binary {
                    if changed {
                        report.binary_copied += 1;
                    }
                } else if changed {
                    report.created_or_updated += 1;
                } else {
                    report.unchanged += 1;
                }
                report.replacement_hits += replacement_hits;
                report.file_results.push(FileResult {
                    source_rel: action.source_rel.clone(),
                    target_rel: action.target_rel.clone(),
                    changed,
                    replacement_hits,
                    skipped_binary: action.is_binary,
                });
                emit_event(
                    on_event,
                    ExecutionEvent::FileDone {
                        index,
                        total,
                        path: action.source_rel.clone(),
                        changed,
                    },
                );
            }
            Outcome::Skipped { warning } => {
                warn!("{}", warning);
                report.warnings.push(warning);
                if !action.is_binary {
                    report.unchanged += 1;
                }
                emit_event(
                    on_event,
                    ExecutionEvent::FileDone {
                        index,
                        total,
                        path: action.source_rel.clone(),
                        changed: false,
                    },
                );
            }
            Outcome::Failed { error } => {
                warn!("{}", error);
                if !action.is_binary {
                    report.unchanged += 1;
                }
                emit_event(
                    on_event,
                    ExecutionEvent::FileError {
                        index,
                        total,
                        path: action.source_rel.clone(),
                        message: error.clone(),
                    },
                );
                report.errors.push(error);
            }
        }
    }

    emit_event(
        on_event,
        ExecutionEvent::Complete {
            scanned: report.scanned,
            changed: report.created_or_updated + report.binary_copied,
        },
    );

    if config.verify.enabled && !dry_run {
        info!("Running verification...");
        let commands = plan_verification(plan, &plan.target_root, &config.verify);
        report.verify_results = run_verification(&commands, runner);
    }

    Ok(report)
}

/// Fail before any write if a solution file references an unplanned project.
fn preflight_orphans(plan: &SyncPlan, ctx: &RunContext<'_>) -> Result<(), RerootError> {
    for action in plan.actions.iter().filter(|action| !action.is_binary) {
        let Some(format) = format_for(&action.source_abs) else {
            continue;
        };
        if !format.reports_orphans() {
            continue;
        }
        let Some(decoded) = read_text(&action.source_abs, &ctx.encodings) else {
            continue;
        };

        let rebase = RebaseContext::new(&action.source_abs, &action.target_abs, &ctx.abs_map);
        if let Some(reference) = first_orphan(format, &decoded.text, &rebase) {
            return Err(RerootError::OrphanReference {
                file: action.source_abs.clone(),
                reference,
            });
        }
    }
    Ok(())
}

fn sync_text(
    action: &FileAction,
    ctx: &RunContext<'_>,
    warnings: &mut Vec<String>,
) -> Result<Outcome, RerootError> {
    let Some(decoded) = read_text(&action.source_abs, &ctx.encodings) else {
        return Ok(Outcome::Skipped {
            warning: format!("skip unreadable text file: {}", action.source_abs.display()),
        });
    };

    if let Some(forward) = &action.forward_replacements {
        match forward_matches(&action.target_abs, forward, &decoded.text, ctx) {
            Some(true) => {
                return Ok(Outcome::Synced {
                    changed: false,
                    replacement_hits: 0,
                })
            }
            Some(false) => {
                let warning = format!(
                    "one-way replacement cannot be reversed, removed text is lost: {}",
                    action.target_abs.display()
                );
                warn!("{}", warning);
                warnings.push(warning);
            }
            None => {}
        }
    }

    let (text, protected) = match format_for(&action.source_abs) {
        Some(format) => {
            let rebase = RebaseContext::new(&action.source_abs, &action.target_abs, &ctx.abs_map);
            let structural = rewrite_references(
                format,
                &decoded.text,
                &rebase,
                ctx.config.sln.orphan_policy,
            )?;
            if structural.rewritten() > 0 {
                debug!(
                    "rebased {} reference(s) in {}",
                    structural.rewritten(),
                    action.source_rel
                );
            }
            warnings.extend(structural.warnings);
            (structural.text, structural.protected)
        }
        None => (decoded.text, Vec::new()),
    };

    let (text, replacement_hits) =
        apply_replacements_outside(&text, &action.replacements, &protected);

    let Some(bytes) = encode_text(&text, decoded.encoding) else {
        let err = RerootError::Encoding {
            path: action.target_abs.clone(),
            encoding: decoded.encoding.name().to_string(),
        };
        return Ok(Outcome::Skipped {
            warning: err.to_string(),
        });
    };

    let changed = match fs::read(&action.target_abs) {
        Ok(existing) => existing != bytes,
        Err(_) => true,
    };
    if changed && !ctx.dry_run {
        if let Some(outcome) = guard_syncback_parent(&action.target_abs, ctx) {
            return Ok(outcome);
        }
        if let Err(err) = write_text_file(&action.target_abs, &bytes) {
            return Ok(Outcome::Failed {
                error: format!("write failed for {}: {}", action.target_abs.display(), err),
            });
        }
    }

    Ok(Outcome::Synced {
        changed,
        replacement_hits,
    })
}

fn sync_binary(action: &FileAction, ctx: &RunContext<'_>) -> Outcome {
    let changed = match files_identical(&action.source_abs, &action.target_abs) {
        Ok(identical) => !identical,
        Err(err) => {
            return Outcome::Failed {
                error: format!("compare failed for {}: {}", action.source_abs.display(), err),
            }
        }
    };

    if changed && !ctx.dry_run {
        if let Some(outcome) = guard_syncback_parent(&action.target_abs, ctx) {
            return outcome;
        }
        if let Err(err) = copy_file_atomic(&action.source_abs, &action.target_abs) {
            return Outcome::Failed {
                error: format!("copy failed for {}: {}", action.target_abs.display(), err),
            };
        }
    }

    Outcome::Synced {
        changed,
        replacement_hits: 0,
    }
}

/// Whether the existing syncback target, run through the forward
/// replacements, already equals `synced_text`. `None` if it cannot be read.
fn forward_matches(
    target: &Path,
    forward: &[Replacement],
    synced_text: &str,
    ctx: &RunContext<'_>,
) -> Option<bool> {
    let existing = read_text(target, &ctx.encodings)?;
    let (expected, _) = apply_text_replacements(&existing.text, forward);
    Some(expected == synced_text)
}

/// Syncback never creates directories in the original source tree.
fn guard_syncback_parent(target: &Path, ctx: &RunContext<'_>) -> Option<Outcome> {
    if !ctx.reverse || target.exists() {
        return None;
    }
    let parent_exists = target.parent().map(Path::is_dir).unwrap_or(false);
    if parent_exists {
        None
    } else {
        Some(Outcome::Skipped {
            warning: format!(
                "skip create (missing source directory): {}",
                target.display()
            ),
        })
    }
}

fn write_text_file(target: &Path, bytes: &[u8]) -> Result<(), RerootError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    write_bytes_atomic(target, bytes)
}

fn emit_event(on_event: Option<&ExecutionCallback>, event: ExecutionEvent) {
    if let Some(callback) = on_event {
        callback(&event);
    }
}
