//! Structural rewriting of project references
//!
//! Solution and project files embed relative paths to other project files.
//! When the tree is renamed those paths have to be recomputed from the real
//! source and destination locations rather than patched by string
//! substitution, since the renaming scheme need not be a bijection.
//!
//! Each format sits behind [`ReferenceFormat`]: it extracts references as byte
//! spans and decides how each one is rebased. [`rewrite_references`] drives the
//! splice and applies the orphan policy. The formats are matched with regular
//! expressions over the raw text, not parsed.

mod paths;
mod project;
mod solution;
mod text;

pub use paths::{absolutize, normalize_lexically, relative_to, to_backslashes};
pub use project::{ProjectFormat, PROJECT_FORMAT_EXTENSIONS};
pub use solution::{SolutionFormat, KNOWN_PROJECT_EXTENSIONS};
pub use text::{apply_replacements_outside, apply_text_replacements};

use crate::config::OrphanPolicy;
use crate::mapping::normalize_separators;
use crate::planner::SyncPlan;
use crate::types::RerootError;
use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Absolute source path -> absolute destination path, for every planned file
#[derive(Debug, Clone, Default)]
pub struct AbsPathMap {
    entries: HashMap<PathBuf, PathBuf>,
}

impl AbsPathMap {
    /// Build the lookup from the plan that the rewrites will run against.
    pub fn from_plan(plan: &SyncPlan) -> Self {
        let mut map = Self::default();
        for action in &plan.actions {
            map.insert(&action.source_abs, &action.target_abs);
        }
        map
    }

    /// Later inserts for the same source win.
    pub fn insert(&mut self, source_abs: &Path, target_abs: &Path) {
        self.entries.insert(
            normalize_lexically(source_abs),
            normalize_lexically(target_abs),
        );
    }

    pub fn get(&self, source_abs: &Path) -> Option<&Path> {
        self.entries
            .get(&normalize_lexically(source_abs))
            .map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A path reference found in structured text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Byte range of the path value inside the content
    pub span: Range<usize>,
    pub value: String,
}

/// Decision for one reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rebased {
    /// Leave the text as it is
    Keep,

    /// Substitute this value for the span
    Replace(String),

    /// The target is not part of the plan
    Orphan,
}

/// Where a structured file comes from and where it is going
#[derive(Debug, Clone)]
pub struct RebaseContext<'a> {
    pub source_file: &'a Path,
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub abs_map: &'a AbsPathMap,
}

impl<'a> RebaseContext<'a> {
    pub fn new(source_file: &'a Path, target_file: &Path, abs_map: &'a AbsPathMap) -> Self {
        let parent = |file: &Path| {
            normalize_lexically(file.parent().unwrap_or_else(|| Path::new("")))
        };
        Self {
            source_file,
            source_dir: parent(source_file),
            target_dir: parent(target_file),
            abs_map,
        }
    }

    /// Resolve a (possibly backslash-separated) reference against the source directory.
    pub fn resolve_source(&self, raw: &str) -> PathBuf {
        normalize_lexically(&self.source_dir.join(normalize_separators(raw)))
    }

    /// Destination-relative, backslash-joined form of `raw`, if it is planned.
    pub fn rebase_value(&self, raw: &str) -> Option<String> {
        let mapped = self.abs_map.get(&self.resolve_source(raw))?;
        Some(to_backslashes(&relative_to(mapped, &self.target_dir)))
    }
}

/// A structured text format with embedded project-relative paths
pub trait ReferenceFormat: Sync {
    fn name(&self) -> &'static str;

    /// Lowercase file extensions (with dot) handled by this format
    fn extensions(&self) -> &'static [&'static str];

    /// Path references in content order, non-overlapping
    fn extract_references(&self, content: &str) -> Vec<Reference>;

    fn rewrite_reference(&self, reference: &Reference, ctx: &RebaseContext<'_>) -> Rebased;

    /// Whether unresolved references are warnings (and subject to the orphan policy)
    fn reports_orphans(&self) -> bool {
        false
    }

    fn handles(&self, path: &Path) -> bool {
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        self.extensions().contains(&extension.as_str())
    }
}

/// Output of one structural pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuralRewrite {
    pub text: String,

    /// Byte ranges of rewritten values in `text`; generic replacement skips them
    pub protected: Vec<Range<usize>>,

    pub warnings: Vec<String>,
}

impl StructuralRewrite {
    pub fn rewritten(&self) -> usize {
        self.protected.len()
    }
}

static SOLUTION: SolutionFormat = SolutionFormat;
static PROJECT: ProjectFormat = ProjectFormat;

/// The structured format for a file, if any.
pub fn format_for(path: &Path) -> Option<&'static dyn ReferenceFormat> {
    if SOLUTION.handles(path) {
        Some(&SOLUTION)
    } else if PROJECT.handles(path) {
        Some(&PROJECT)
    } else {
        None
    }
}

pub fn orphan_message(source_file: &Path, reference: &str) -> String {
    format!(
        "orphan project reference in {}: {} (not found in source map)",
        source_file.display(),
        reference
    )
}

/// Rebase every reference `format` finds in `content`.
///
/// Under [`OrphanPolicy::Strict`] the first orphan aborts with
/// [`RerootError::OrphanReference`] and nothing is returned for the file.
pub fn rewrite_references(
    format: &dyn ReferenceFormat,
    content: &str,
    ctx: &RebaseContext<'_>,
    policy: OrphanPolicy,
) -> Result<StructuralRewrite, RerootError> {
    let mut result = StructuralRewrite {
        text: String::with_capacity(content.len()),
        ..StructuralRewrite::default()
    };
    let mut cursor = 0;

    for reference in format.extract_references(content) {
        match format.rewrite_reference(&reference, ctx) {
            Rebased::Keep => {}
            Rebased::Orphan => {
                if !format.reports_orphans() {
                    continue;
                }
                if policy == OrphanPolicy::Strict {
                    return Err(RerootError::OrphanReference {
                        file: ctx.source_file.to_path_buf(),
                        reference: reference.value,
                    });
                }
                let warning = orphan_message(ctx.source_file, &reference.value);
                warn!("{}", warning);
                result.warnings.push(warning);
            }
            Rebased::Replace(value) => {
                result.text.push_str(&content[cursor..reference.span.start]);
                let start = result.text.len();
                result.text.push_str(&value);
                result.protected.push(start..result.text.len());
                cursor = reference.span.end;
            }
        }
    }
    result.text.push_str(&content[cursor..]);

    Ok(result)
}

/// Find the first orphan a strict run would stop on, without rewriting.
pub fn first_orphan(
    format: &dyn ReferenceFormat,
    content: &str,
    ctx: &RebaseContext<'_>,
) -> Option<String> {
    if !format.reports_orphans() {
        return None;
    }
    format
        .extract_references(content)
        .into_iter()
        .find(|reference| format.rewrite_reference(reference, ctx) == Rebased::Orphan)
        .map(|reference| reference.value)
}
