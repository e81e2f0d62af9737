//! `.gitignore` evaluation
//!
//! A deliberately small subset of gitignore semantics: rules are evaluated in
//! file order and the last matching rule decides. There is no parent-directory
//! short-circuit, so a later negated rule can re-include a file that sits under
//! an excluded directory.

use crate::types::RerootError;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Name of the ignore file read from the root of the walked tree
pub const IGNORE_FILE_NAME: &str = ".gitignore";

/// One non-comment, non-blank line of an ignore file
#[derive(Debug, Clone)]
pub struct GitIgnoreRule {
    /// Pattern text with `!`, leading `/` and trailing `/` stripped
    pub pattern: String,
    pub negated: bool,
    pub directory_only: bool,
    pub rooted: bool,
    path_regex: Regex,
    segment_regex: Option<Regex>,
}

impl GitIgnoreRule {
    /// Parse one line; `None` for blanks, comments and empty patterns.
    pub fn parse(raw_line: &str) -> Result<Option<Self>, RerootError> {
        let mut line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let negated = line.starts_with('!');
        if negated {
            line = &line[1..];
        }

        let rooted = line.starts_with('/');
        if rooted {
            line = &line[1..];
        }

        let directory_only = line.ends_with('/');
        if directory_only {
            line = &line[..line.len() - 1];
        }

        if line.is_empty() {
            return Ok(None);
        }

        let path_regex = compile(line, rooted)?;
        // Basename-style match for patterns without a separator
        let segment_regex = if line.contains('/') {
            None
        } else {
            Some(compile(line, true)?)
        };

        Ok(Some(Self {
            pattern: line.to_string(),
            negated,
            directory_only,
            rooted,
            path_regex,
            segment_regex,
        }))
    }

    /// Does this rule match the relative POSIX path?
    pub fn matches(&self, relative_path: &str) -> bool {
        let normalized = relative_path.trim_matches('/');
        if normalized.is_empty() {
            return false;
        }

        if self.directory_only
            && (normalized == self.pattern
                || normalized
                    .strip_prefix(self.pattern.as_str())
                    .is_some_and(|rest| rest.starts_with('/')))
        {
            return true;
        }

        if self.path_regex.is_match(normalized) {
            return true;
        }

        match &self.segment_regex {
            Some(regex) => normalized.split('/').any(|segment| regex.is_match(segment)),
            None => false,
        }
    }
}

/// Translate gitignore wildcards into an anchored regular expression.
///
/// `*` and `?` stay within one path segment, `**` crosses separators.
fn pattern_to_regex(pattern: &str, rooted: bool) -> String {
    let mut body = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    body.push_str(".*");
                } else {
                    body.push_str("[^/]*");
                }
            }
            '?' => body.push_str("[^/]"),
            other => body.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
        }
    }

    if rooted {
        format!("^{}$", body)
    } else {
        format!("(^|.*/){}$", body)
    }
}

fn compile(pattern: &str, rooted: bool) -> Result<Regex, RerootError> {
    Regex::new(&pattern_to_regex(pattern, rooted)).map_err(|e| RerootError::Pattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Ordered rule list loaded from an ignore file
#[derive(Debug, Clone, Default)]
pub struct IgnoreMatcher {
    rules: Vec<GitIgnoreRule>,
}

impl IgnoreMatcher {
    /// A matcher that ignores nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load `<root>/.gitignore`; a missing file gives an empty matcher.
    ///
    /// Invalid UTF-8 in the ignore file is replaced rather than rejected.
    pub fn from_root(root: &Path) -> Result<Self, RerootError> {
        let ignore_file = root.join(IGNORE_FILE_NAME);
        if !ignore_file.is_file() {
            return Ok(Self::empty());
        }
        let bytes = fs::read(&ignore_file)?;
        Self::from_lines(String::from_utf8_lossy(&bytes).lines())
    }

    pub fn from_lines<'a, I>(lines: I) -> Result<Self, RerootError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut rules = Vec::new();
        for line in lines {
            if let Some(rule) = GitIgnoreRule::parse(line)? {
                rules.push(rule);
            }
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[GitIgnoreRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Final verdict after scanning every rule; later matches override earlier ones.
    pub fn is_ignored(&self, relative_path: &str) -> bool {
        let mut ignored = false;
        for rule in &self.rules {
            if rule.matches(relative_path) {
                ignored = !rule.negated;
            }
        }
        ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn matcher(lines: &[&str]) -> IgnoreMatcher {
        IgnoreMatcher::from_lines(lines.iter().copied()).expect("rules should compile")
    }

    #[test]
    fn test_parse_flags() {
        let rule = GitIgnoreRule::parse("!/build/").unwrap().unwrap();
        assert!(rule.negated);
        assert!(rule.rooted);
        assert!(rule.directory_only);
        assert_eq!(rule.pattern, "build");
    }

    #[test]
    fn test_comments_and_blanks_are_skipped() {
        let m = matcher(&["# comment", "", "   ", "/", "!"]);
        assert!(m.is_empty());
    }

    #[test]
    fn test_simple_file_name_matches_anywhere() {
        let m = matcher(&["ignored.log"]);
        assert!(m.is_ignored("ignored.log"));
        assert!(m.is_ignored("nested/dir/ignored.log"));
        assert!(!m.is_ignored("ignored.log.bak"));
    }

    #[test]
    fn test_star_stays_in_segment() {
        let m = matcher(&["/logs/*.log"]);
        assert!(m.is_ignored("logs/a.log"));
        assert!(!m.is_ignored("logs/deep/a.log"));
        assert!(!m.is_ignored("other/logs/a.log"));
    }

    #[test]
    fn test_double_star_crosses_segments() {
        let m = matcher(&["logs/**/*.log"]);
        assert!(m.is_ignored("logs/deep/a.log"));
        assert!(m.is_ignored("app/logs/x/y/z.log"));
    }

    #[test]
    fn test_question_mark() {
        let m = matcher(&["file?.txt"]);
        assert!(m.is_ignored("file1.txt"));
        assert!(!m.is_ignored("file10.txt"));
    }

    #[test]
    fn test_directory_only_rule() {
        let m = matcher(&["build/"]);
        assert!(m.is_ignored("build/out.txt"));
        assert!(m.is_ignored("build/nested/out.txt"));
        assert!(!m.is_ignored("buildinfo.txt"));
    }

    #[test]
    fn test_segment_match_for_directory_names() {
        let m = matcher(&["node_modules"]);
        assert!(m.is_ignored("web/node_modules/pkg/index.js"));
    }

    #[test]
    fn test_negation_reincludes_file() {
        let m = matcher(&["build/", "!build/keep.txt"]);
        assert!(!m.is_ignored("build/keep.txt"));
        assert!(m.is_ignored("build/other.txt"));
    }

    #[test]
    fn test_last_rule_wins() {
        let m = matcher(&["!*.txt", "*.txt"]);
        assert!(m.is_ignored("a.txt"));

        let m = matcher(&["*.txt", "!important.txt"]);
        assert!(!m.is_ignored("important.txt"));
        assert!(m.is_ignored("other.txt"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let m = matcher(&["a+b(1).txt"]);
        assert!(m.is_ignored("a+b(1).txt"));
        assert!(!m.is_ignored("aab1.txt"));
    }

    #[test]
    fn test_from_root_missing_file() {
        let dir = TempDir::new().unwrap();
        let m = IgnoreMatcher::from_root(dir.path()).unwrap();
        assert!(m.is_empty());
        assert!(!m.is_ignored("anything.txt"));
    }

    #[test]
    fn test_from_root_reads_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "*.tmp\r\n# note\nbin/\n").unwrap();
        let m = IgnoreMatcher::from_root(dir.path()).unwrap();
        assert_eq!(m.rules().len(), 2);
        assert!(m.is_ignored("x.tmp"));
        assert!(m.is_ignored("bin/app.exe"));
    }
}
