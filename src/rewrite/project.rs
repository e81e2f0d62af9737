//! MSBuild project files

use super::{Rebased, RebaseContext, Reference, ReferenceFormat};
use regex::Regex;
use std::sync::LazyLock;

/// Project and shared build files whose `Include="..."` values are rebased
pub const PROJECT_FORMAT_EXTENSIONS: &[&str] = &[
    ".csproj", ".fsproj", ".vbproj", ".vcxproj", ".shproj", ".sqlproj", ".dcproj", ".wapproj",
    ".props", ".targets",
];

static INCLUDE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Include\s*=\s*"([^"]+)""#).expect("include attribute pattern is valid")
});

/// `Include="..."` attributes; values outside the plan are left alone
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectFormat;

fn is_absolute_reference(value: &str) -> bool {
    let bytes = value.as_bytes();
    value.starts_with('/')
        || value.starts_with('\\')
        || (bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
}

impl ReferenceFormat for ProjectFormat {
    fn name(&self) -> &'static str {
        "project"
    }

    fn extensions(&self) -> &'static [&'static str] {
        PROJECT_FORMAT_EXTENSIONS
    }

    fn extract_references(&self, content: &str) -> Vec<Reference> {
        INCLUDE_ATTR
            .captures_iter(content)
            .filter_map(|caps| caps.get(1))
            .map(|value| Reference {
                span: value.range(),
                value: value.as_str().to_string(),
            })
            .collect()
    }

    fn rewrite_reference(&self, reference: &Reference, ctx: &RebaseContext<'_>) -> Rebased {
        if is_absolute_reference(&reference.value) {
            return Rebased::Keep;
        }
        // package names and wildcards never resolve to a planned file
        ctx.rebase_value(&reference.value)
            .map_or(Rebased::Keep, Rebased::Replace)
    }
}
