//! Configuration management
//!
//! A run is driven by one immutable [`AppConfig`]. The base value comes from a
//! config file (or [`AppConfig::default`]), command-line layers are collected
//! into [`ConfigOverrides`], and [`AppConfig::merged`] folds them into a new
//! validated value.

mod cli;
mod load;

pub use cli::{Cli, LogLevel};
pub use load::{load_config, parse_config_str, parse_inline_mapping, parse_inline_replacement};

use crate::executor::encoding::resolve_encodings;
use crate::scanner::GlobPattern;
use crate::types::RerootError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Text extensions that are never sniffed for binary content.
pub const DEFAULT_TEXT_EXTENSIONS: &[&str] = &[
    ".py",
    ".cs",
    ".razor",
    ".cshtml",
    ".xaml",
    ".razor.css",
    ".sln",
    ".csproj",
    ".props",
    ".targets",
    ".json",
    ".yaml",
    ".yml",
    ".md",
    ".txt",
    ".xml",
    ".config",
];

/// Decode attempts, in priority order.
///
/// `windows-1252` maps every byte, so with this list every file decodes and a
/// file is only ever skipped as unreadable with a custom `encodings` list.
pub const DEFAULT_ENCODINGS: &[&str] = &["utf-8", "gb18030", "gbk", "windows-1252"];

/// Literal substring rename applied to relative paths (and, implicitly, to content).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathMapping {
    #[serde(rename = "from")]
    pub from_value: String,
    #[serde(rename = "to")]
    pub to_value: String,
}

impl PathMapping {
    pub fn new(from_value: impl Into<String>, to_value: impl Into<String>) -> Self {
        Self {
            from_value: from_value.into(),
            to_value: to_value.into(),
        }
    }

    /// The same mapping as a content replacement, swapped when `reverse`.
    pub fn as_replacement(&self, reverse: bool) -> Replacement {
        let replacement = Replacement::new(self.from_value.clone(), self.to_value.clone());
        if reverse {
            replacement.reversed()
        } else {
            replacement
        }
    }
}

/// Literal substring replacement applied to file content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Replacement {
    #[serde(rename = "from")]
    pub from_value: String,
    #[serde(rename = "to")]
    pub to_value: String,
}

impl Replacement {
    pub fn new(from_value: impl Into<String>, to_value: impl Into<String>) -> Self {
        Self {
            from_value: from_value.into(),
            to_value: to_value.into(),
        }
    }

    pub fn reversed(&self) -> Self {
        Self {
            from_value: self.to_value.clone(),
            to_value: self.from_value.clone(),
        }
    }
}

fn default_path_glob() -> String {
    "**/*".to_string()
}

/// Replacements applied to files matching a glob and an optional extension list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRule {
    #[serde(default = "default_path_glob")]
    pub path_glob: String,

    /// Lowercase extensions with a leading dot; empty means any extension
    #[serde(default)]
    pub extensions: Vec<String>,

    #[serde(default)]
    pub replacements: Vec<Replacement>,
}

impl Default for ContentRule {
    fn default() -> Self {
        Self {
            path_glob: default_path_glob(),
            extensions: Vec::new(),
            replacements: Vec::new(),
        }
    }
}

/// What to do with a solution reference that resolves to no planned file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OrphanPolicy {
    /// Keep the line, record a warning
    #[default]
    Warn,

    /// Abort the run before anything is written
    Strict,
}

impl TryFrom<String> for OrphanPolicy {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "warn" => Ok(OrphanPolicy::Warn),
            "strict" => Ok(OrphanPolicy::Strict),
            _ => Err(format!(
                "sln.orphan_policy must be 'warn' or 'strict', got '{}'",
                value
            )),
        }
    }
}

impl From<OrphanPolicy> for String {
    fn from(policy: OrphanPolicy) -> Self {
        policy.to_string()
    }
}

impl fmt::Display for OrphanPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrphanPolicy::Warn => f.write_str("warn"),
            OrphanPolicy::Strict => f.write_str("strict"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlnOptions {
    pub orphan_policy: OrphanPolicy,
}

/// External build/compile checks run after a non-dry-run sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyOptions {
    pub enabled: bool,
    pub dotnet_build: bool,
    pub python_compileall: bool,

    /// Upper bound for a single tool invocation
    pub timeout_secs: u64,

    pub dotnet_command: String,
    pub python_command: String,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            dotnet_build: true,
            python_compileall: true,
            timeout_secs: 600,
            dotnet_command: "dotnet".to_string(),
            python_command: "python".to_string(),
        }
    }
}

/// Global configuration for a rerooter run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Source root (the command line takes precedence)
    pub source: Option<PathBuf>,

    /// Destination root (the command line takes precedence)
    pub target: Option<PathBuf>,

    pub path_mappings: Vec<PathMapping>,
    pub content_rules: Vec<ContentRule>,
    pub sln: SlnOptions,
    pub verify: VerifyOptions,
    pub include_globs: Vec<String>,
    pub exclude_globs: Vec<String>,
    pub ignore_extensions: Vec<String>,
    pub text_extensions: Vec<String>,

    /// Encoding labels tried in order when reading text files
    pub encodings: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: None,
            target: None,
            path_mappings: Vec::new(),
            content_rules: Vec::new(),
            sln: SlnOptions::default(),
            verify: VerifyOptions::default(),
            include_globs: Vec::new(),
            exclude_globs: Vec::new(),
            ignore_extensions: Vec::new(),
            text_extensions: DEFAULT_TEXT_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            encodings: DEFAULT_ENCODINGS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// One layer of command-line overrides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub source: Option<PathBuf>,
    pub target: Option<PathBuf>,
    pub path_mappings: Vec<PathMapping>,
    pub replacements: Vec<Replacement>,
    pub include_globs: Vec<String>,
    pub exclude_globs: Vec<String>,
    pub ignore_extensions: Vec<String>,
    pub no_verify: bool,
}

impl AppConfig {
    /// Fold an override layer into a new validated configuration.
    ///
    /// Inline replacements become one trailing content rule matching every file.
    pub fn merged(&self, overrides: ConfigOverrides) -> Result<AppConfig, RerootError> {
        let mut next = self.clone();

        if overrides.source.is_some() {
            next.source = overrides.source;
        }
        if overrides.target.is_some() {
            next.target = overrides.target;
        }

        next.path_mappings.extend(overrides.path_mappings);
        if !overrides.replacements.is_empty() {
            next.content_rules.push(ContentRule {
                replacements: overrides.replacements,
                ..ContentRule::default()
            });
        }
        next.include_globs.extend(overrides.include_globs);
        next.exclude_globs.extend(overrides.exclude_globs);
        next.ignore_extensions.extend(overrides.ignore_extensions);
        if overrides.no_verify {
            next.verify.enabled = false;
        }

        next.normalized().validated()
    }

    /// Lowercase every extension list and make sure each entry starts with a dot.
    pub fn normalized(mut self) -> Self {
        for rule in &mut self.content_rules {
            rule.extensions = normalize_extensions(&rule.extensions);
        }
        self.ignore_extensions = normalize_extensions(&self.ignore_extensions);
        self.text_extensions = normalize_extensions(&self.text_extensions);
        self
    }

    /// Validate and hand the configuration back.
    pub fn validated(self) -> Result<Self, RerootError> {
        self.validate()?;
        Ok(self)
    }

    /// Validate configuration before any filesystem work.
    pub fn validate(&self) -> Result<(), RerootError> {
        for mapping in &self.path_mappings {
            if mapping.from_value.is_empty() {
                return Err(RerootError::Config(
                    "path_mappings.from cannot be empty".to_string(),
                ));
            }
        }

        for rule in &self.content_rules {
            GlobPattern::new(&rule.path_glob)?;
            for replacement in &rule.replacements {
                if replacement.from_value.is_empty() {
                    return Err(RerootError::Config(
                        "replacement.from cannot be empty".to_string(),
                    ));
                }
            }
        }

        for pattern in self.include_globs.iter().chain(&self.exclude_globs) {
            GlobPattern::new(pattern)?;
        }

        resolve_encodings(&self.encodings)?;

        if self.verify.timeout_secs == 0 {
            return Err(RerootError::Config(
                "verify.timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// `MD` -> `.md`, `.Py` -> `.py`; blank entries are dropped.
pub fn normalize_extension(ext: &str) -> Option<String> {
    let trimmed = ext.trim().to_lowercase();
    if trimmed.is_empty() || trimmed == "." {
        return None;
    }
    if trimmed.starts_with('.') {
        Some(trimmed)
    } else {
        Some(format!(".{}", trimmed))
    }
}

fn normalize_extensions(values: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if let Some(ext) = normalize_extension(value) {
            if !normalized.contains(&ext) {
                normalized.push(ext);
            }
        }
    }
    normalized
}
