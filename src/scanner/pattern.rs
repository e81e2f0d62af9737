//! Include/exclude glob patterns
//!
//! No single glob dialect treats `**`-recursive and flat patterns the same way,
//! so a pattern is tried against several forms and the first hit wins:
//!
//! 1. path-segment glob (`*` stops at `/`, `**` spans segments), right-anchored
//!    so `*.cs` matches `src/a.cs`
//! 2. flat shell-style glob (`*` also matches `/`)
//! 3. both of the above with a leading `**/` stripped
//! 4. both of the above with every `/**/` collapsed to `/`

use crate::types::RerootError;
use camino::Utf8Path;
use glob::{MatchOptions, Pattern};
use globset::{GlobBuilder, GlobMatcher};

const MATCH_ALL: &[&str] = &["**", "**/*", "*"];

const FLAT_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// One pattern form: segment-aware and flat matchers
#[derive(Debug, Clone)]
struct GlobForm {
    segment: GlobMatcher,
    flat: Pattern,
    anchored: bool,
}

impl GlobForm {
    fn compile(pattern: &str) -> Result<Self, RerootError> {
        let to_error = |message: String| RerootError::Pattern {
            pattern: pattern.to_string(),
            message,
        };

        let anchored = pattern.starts_with('/');
        let segment = GlobBuilder::new(pattern.trim_start_matches('/'))
            .literal_separator(true)
            .backslash_escape(true)
            .build()
            .map_err(|e| to_error(e.to_string()))?
            .compile_matcher();

        // In a flat match `**` and `*` both mean "anything"
        let flat = Pattern::new(&collapse_stars(pattern)).map_err(|e| to_error(e.to_string()))?;

        Ok(Self {
            segment,
            flat,
            anchored,
        })
    }

    fn matches(&self, path: &str) -> bool {
        self.matches_segments(path) || self.flat.matches_with(path, FLAT_OPTIONS)
    }

    /// Relative patterns match any trailing run of path segments.
    fn matches_segments(&self, path: &str) -> bool {
        if self.anchored {
            return self.segment.is_match(path);
        }
        let mut rest = path;
        loop {
            if self.segment.is_match(rest) {
                return true;
            }
            match rest.split_once('/') {
                Some((_, tail)) if !tail.is_empty() => rest = tail,
                _ => return false,
            }
        }
    }
}

fn collapse_stars(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for ch in pattern.chars() {
        if ch == '*' && out.ends_with('*') {
            continue;
        }
        out.push(ch);
    }
    out
}

/// A compiled include/exclude glob
#[derive(Debug, Clone)]
pub struct GlobPattern {
    raw: String,
    forms: Vec<GlobForm>,
}

impl GlobPattern {
    /// Compile every fallback form up front; any invalid form is a pattern error.
    pub fn new(pattern: &str) -> Result<Self, RerootError> {
        if MATCH_ALL.contains(&pattern) {
            return Ok(Self {
                raw: pattern.to_string(),
                forms: Vec::new(),
            });
        }

        let mut forms = vec![GlobForm::compile(pattern)?];
        if let Some(stripped) = pattern.strip_prefix("**/") {
            if !stripped.is_empty() {
                forms.push(GlobForm::compile(stripped)?);
            }
        }
        if pattern.contains("/**/") {
            forms.push(GlobForm::compile(&pattern.replace("/**/", "/"))?);
        }

        Ok(Self {
            raw: pattern.to_string(),
            forms,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches_all(&self) -> bool {
        self.forms.is_empty()
    }

    /// Match a relative POSIX path.
    pub fn matches(&self, relative_path: &Utf8Path) -> bool {
        self.matches_str(relative_path.as_str())
    }

    pub fn matches_str(&self, relative_path: &str) -> bool {
        self.matches_all() || self.forms.iter().any(|form| form.matches(relative_path))
    }
}

/// Compile a list of globs, failing on the first invalid one.
pub fn compile_globs(patterns: &[String]) -> Result<Vec<GlobPattern>, RerootError> {
    patterns.iter().map(|p| GlobPattern::new(p)).collect()
}

/// One-off match; an invalid pattern never matches.
pub fn glob_match(relative_path: &str, pattern: &str) -> bool {
    GlobPattern::new(pattern)
        .map(|compiled| compiled.matches_str(relative_path))
        .unwrap_or(false)
}
