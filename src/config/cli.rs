//! Command-line arguments

use super::{parse_inline_mapping, parse_inline_replacement, ConfigOverrides};
use crate::types::RerootError;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Console detail level for runtime logs and the final report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, ValueEnum)]
pub enum LogLevel {
    /// Counters, warnings and errors only
    Summary,

    /// Phase milestones and the first changed files
    Normal,

    /// Everything, including per-file progress
    #[default]
    Debug,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Summary => "summary",
            LogLevel::Normal => "normal",
            LogLevel::Debug => "debug",
        }
    }

    /// Default `tracing` filter directive for this level
    pub fn filter_directive(self) -> &'static str {
        match self {
            LogLevel::Summary => "warn",
            LogLevel::Normal => "info",
            LogLevel::Debug => "debug",
        }
    }
}

/// Mirror a project tree under a new layout.
#[derive(Parser, Debug, Clone)]
#[command(name = "rerooter", version, about)]
pub struct Cli {
    /// Source root path
    #[arg(long)]
    pub src: Option<PathBuf>,

    /// Destination root path
    #[arg(long)]
    pub dst: Option<PathBuf>,

    /// Path to a .json/.toml/.yaml/.yml config
    #[arg(long)]
    pub mapconfig: Option<PathBuf>,

    /// Path mapping: from=to (repeatable)
    #[arg(long = "map", value_name = "FROM=TO")]
    pub map: Vec<String>,

    /// Content replacement: from=to (repeatable)
    #[arg(long = "replace", value_name = "FROM=TO")]
    pub replace: Vec<String>,

    /// Include glob (repeatable)
    #[arg(long = "include", value_name = "GLOB")]
    pub include: Vec<String>,

    /// Exclude glob (repeatable)
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Ignore files with this extension (repeatable, e.g. md or .md)
    #[arg(long = "ignore-ext", value_name = "EXT")]
    pub ignore_ext: Vec<String>,

    /// Apply changes (default is a dry run)
    #[arg(long)]
    pub apply: bool,

    /// Reverse sync: destination back into source
    #[arg(long)]
    pub syncback: bool,

    /// Skip verification steps
    #[arg(long)]
    pub no_verify: bool,

    /// Disable ANSI colored console output
    #[arg(long)]
    pub no_color: bool,

    /// Console logging detail level
    #[arg(long, value_enum, default_value_t = LogLevel::Debug)]
    pub log_level: LogLevel,

    /// Also write the report as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub report_json: Option<PathBuf>,
}

impl Cli {
    /// Collect the override layer described by these arguments.
    pub fn overrides(&self) -> Result<ConfigOverrides, RerootError> {
        Ok(ConfigOverrides {
            source: self.src.clone(),
            target: self.dst.clone(),
            path_mappings: parse_inline_mapping(&self.map)?,
            replacements: parse_inline_replacement(&self.replace)?,
            include_globs: self.include.clone(),
            exclude_globs: self.exclude.clone(),
            ignore_extensions: self.ignore_ext.clone(),
            no_verify: self.no_verify,
        })
    }

    pub fn dry_run(&self) -> bool {
        !self.apply
    }
}
