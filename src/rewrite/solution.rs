//! Visual Studio solution files

use super::{Rebased, RebaseContext, Reference, ReferenceFormat};
use crate::mapping::{lowercase_extension, normalize_separators};
use camino::Utf8Path;
use regex::Regex;
use std::sync::LazyLock;

/// Extensions that mark a solution entry as a project file rather than a folder
pub const KNOWN_PROJECT_EXTENSIONS: &[&str] = &[
    ".csproj", ".fsproj", ".vbproj", ".vcxproj", ".shproj", ".sqlproj", ".dcproj", ".wapproj",
];

static PROJECT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^Project\("\{[^\}]+\}"\)\s*=\s*"[^"]+",\s*"([^"]+)"\s*,\s*"\{[^\}]+\}".*$"#)
        .expect("project line pattern is valid")
});

/// `Project("{type}") = "Name", "relative\path.csproj", "{guid}"` lines
#[derive(Debug, Clone, Copy, Default)]
pub struct SolutionFormat;

fn looks_like_project_file(raw: &str) -> bool {
    let normalized = normalize_separators(raw);
    KNOWN_PROJECT_EXTENSIONS.contains(&lowercase_extension(Utf8Path::new(&normalized)).as_str())
}

impl ReferenceFormat for SolutionFormat {
    fn name(&self) -> &'static str {
        "solution"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".sln"]
    }

    fn extract_references(&self, content: &str) -> Vec<Reference> {
        let mut references = Vec::new();
        let mut offset = 0;
        for line in content.split_inclusive('\n') {
            let body = line.trim_end_matches(['\r', '\n']);
            if let Some(path) = PROJECT_LINE.captures(body).and_then(|caps| caps.get(1)) {
                references.push(Reference {
                    span: offset + path.start()..offset + path.end(),
                    value: path.as_str().to_string(),
                });
            }
            offset += line.len();
        }
        references
    }

    fn rewrite_reference(&self, reference: &Reference, ctx: &RebaseContext<'_>) -> Rebased {
        if !looks_like_project_file(&reference.value) {
            return Rebased::Keep;
        }
        match ctx.rebase_value(&reference.value) {
            Some(value) => Rebased::Replace(value),
            None => Rebased::Orphan,
        }
    }

    fn reports_orphans(&self) -> bool {
        true
    }
}
