//! Sync planning
//!
//! Walks the source tree, decides which files take part in the run, where each
//! one lands and which replacements apply to it. The result is an immutable
//! [`SyncPlan`] consumed by the executor.

mod classify;

pub use classify::{has_text_extension, is_binary_file, SNIFF_LEN};

use crate::config::{AppConfig, PathMapping, Replacement};
use crate::mapping::{
    apply_path_mappings, lowercase_extension, mapping_replacements, merge_replacements,
    select_replacements, CompiledRule,
};
use crate::rewrite::absolutize;
use crate::scanner::{collect_files, compile_globs, GlobPattern, IgnoreMatcher};
use crate::types::{FileAction, RerootError};
use camino::{Utf8Path, Utf8PathBuf};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Excluded regardless of configuration
pub const HARD_EXCLUDES: &[&str] = &[".git/**"];

/// The ordered set of file actions for one run direction
#[derive(Debug, Clone)]
pub struct SyncPlan {
    /// Root that was walked (the destination tree for syncback)
    pub source_root: PathBuf,

    /// Root written to (the original source tree for syncback)
    pub target_root: PathBuf,

    pub reverse: bool,
    pub actions: Vec<FileAction>,
    pub skipped_binary: Vec<Utf8PathBuf>,
    pub ignored_by_git: Vec<Utf8PathBuf>,
}

impl SyncPlan {
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn action_for(&self, source_rel: &str) -> Option<&FileAction> {
        self.actions
            .iter()
            .find(|action| action.source_rel.as_str() == source_rel)
    }
}

/// Include/exclude decisions for paths that survived the ignore file
#[derive(Debug, Clone)]
pub struct FileFilter {
    hard_excludes: Vec<GlobPattern>,
    ignore_extensions: Vec<String>,
    includes: Vec<GlobPattern>,
    excludes: Vec<GlobPattern>,
}

impl FileFilter {
    pub fn from_config(config: &AppConfig) -> Result<Self, RerootError> {
        let hard: Vec<String> = HARD_EXCLUDES.iter().map(|p| p.to_string()).collect();
        Ok(Self {
            hard_excludes: compile_globs(&hard)?,
            ignore_extensions: config.ignore_extensions.clone(),
            includes: compile_globs(&config.include_globs)?,
            excludes: compile_globs(&config.exclude_globs)?,
        })
    }

    /// Hard excludes, ignored extensions, include allow-list, exclude deny-list.
    pub fn is_included(&self, relative_path: &Utf8Path) -> bool {
        if self.hard_excludes.iter().any(|g| g.matches(relative_path)) {
            return false;
        }

        let extension = lowercase_extension(relative_path);
        if !extension.is_empty() && self.ignore_extensions.contains(&extension) {
            return false;
        }

        if !self.includes.is_empty() && !self.includes.iter().any(|g| g.matches(relative_path)) {
            return false;
        }

        !self.excludes.iter().any(|g| g.matches(relative_path))
    }
}

/// Build the plan for one direction.
///
/// For syncback, pass the destination tree as `source_root`, the original
/// source tree as `target_root` and `reverse = true`; mappings and
/// replacements are then applied `to` -> `from`.
pub fn build_sync_plan(
    source_root: &Path,
    target_root: &Path,
    config: &AppConfig,
    reverse: bool,
) -> Result<SyncPlan, RerootError> {
    let source_root = absolutize(source_root)?;
    let target_root = absolutize(target_root)?;

    let filter = FileFilter::from_config(config)?;
    let rules = CompiledRule::compile_all(&config.content_rules)?;
    let ignore_matcher = IgnoreMatcher::from_root(&source_root)?;

    let mut plan = SyncPlan {
        source_root: source_root.clone(),
        target_root: target_root.clone(),
        reverse,
        actions: Vec::new(),
        skipped_binary: Vec::new(),
        ignored_by_git: Vec::new(),
    };

    for file in collect_files(&source_root)? {
        if ignore_matcher.is_ignored(file.rel.as_str()) {
            debug!("gitignored: {}", file.rel);
            plan.ignored_by_git.push(file.rel);
            continue;
        }
        if !filter.is_included(&file.rel) {
            debug!("excluded: {}", file.rel);
            continue;
        }

        let target_rel =
            Utf8PathBuf::from(apply_path_mappings(file.rel.as_str(), &config.path_mappings, reverse));
        let target_abs = target_root.join(target_rel.as_std_path());

        let is_binary = is_binary_file(&file.abs, &config.text_extensions);
        let (replacements, forward_replacements) = if is_binary {
            (Vec::new(), None)
        } else {
            resolve_replacements(&file.rel, &rules, &config.path_mappings, reverse)
        };

        if is_binary {
            plan.skipped_binary.push(file.rel.clone());
        }
        plan.actions.push(FileAction {
            source_abs: file.abs,
            source_rel: file.rel,
            target_abs,
            target_rel,
            is_binary,
            replacements,
            forward_replacements,
        });
    }

    info!(
        "Plan ready: actions={}, gitignored={}, binary={}",
        plan.actions.len(),
        plan.ignored_by_git.len(),
        plan.skipped_binary.len()
    );

    Ok(plan)
}

/// Rule and mapping replacements for one text file.
///
/// A replacement with an empty `to` cannot be reversed: on syncback it would
/// have an empty `from` and match between every character. Such pairs are
/// dropped, and the full forward list is returned alongside so the executor
/// can tell an untouched file from an edited one.
fn resolve_replacements(
    relative_path: &Utf8Path,
    rules: &[CompiledRule],
    mappings: &[PathMapping],
    reverse: bool,
) -> (Vec<Replacement>, Option<Vec<Replacement>>) {
    let mut replacements = merge_replacements(
        select_replacements(relative_path, rules, reverse),
        mapping_replacements(mappings, reverse),
    );
    let resolved = replacements.len();
    replacements.retain(|replacement| !replacement.from_value.is_empty());
    if !reverse || replacements.len() == resolved {
        return (replacements, None);
    }

    let forward = merge_replacements(
        select_replacements(relative_path, rules, false),
        mapping_replacements(mappings, false),
    );
    (replacements, Some(forward))
}
