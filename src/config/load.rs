//! Config file loading and inline `from=to` parsing

use super::{AppConfig, PathMapping, Replacement};
use crate::types::RerootError;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*(\]|\})").expect("trailing comma pattern is valid"));

/// Load a configuration file, or the defaults when no path is given.
///
/// The format is chosen by extension: `.json`, `.toml`, `.yaml` or `.yml`.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, RerootError> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };

    let raw_text = fs::read_to_string(path).map_err(|e| {
        RerootError::Config(format!("Cannot read config {}: {}", path.display(), e))
    })?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    parse_config_str(&raw_text, &extension)
}

/// Parse configuration text in the format named by `extension` (without dot).
pub fn parse_config_str(raw_text: &str, extension: &str) -> Result<AppConfig, RerootError> {
    let config: AppConfig = match extension {
        "json" => parse_json_tolerant(raw_text)?,
        "toml" => toml::from_str(raw_text)
            .map_err(|e| RerootError::Config(format!("Invalid TOML config: {}", e)))?,
        "yaml" | "yml" => serde_yaml::from_str(raw_text)
            .map_err(|e| RerootError::Config(format!("Invalid YAML config: {}", e)))?,
        _ => {
            return Err(RerootError::Config(
                "mapconfig must be .json/.toml/.yaml/.yml".to_string(),
            ))
        }
    };

    config.normalized().validated()
}

/// JSON with a retry that drops trailing commas before `]` and `}`.
fn parse_json_tolerant(raw_text: &str) -> Result<AppConfig, RerootError> {
    match serde_json::from_str(raw_text) {
        Ok(config) => Ok(config),
        Err(first) if first.is_syntax() => {
            let sanitized = TRAILING_COMMA.replace_all(raw_text, "$1");
            serde_json::from_str(&sanitized)
                .map_err(|e| RerootError::Config(format!("Invalid JSON config: {}", e)))
        }
        Err(e) => Err(RerootError::Config(format!("Invalid JSON config: {}", e))),
    }
}

fn split_pair<'a>(item: &'a str, kind: &str) -> Result<(&'a str, &'a str), RerootError> {
    let (from_value, to_value) = item.split_once('=').ok_or_else(|| {
        RerootError::Config(format!("invalid {} '{}', expected from=to", kind, item))
    })?;
    let from_value = from_value.trim();
    if from_value.is_empty() {
        return Err(RerootError::Config(format!(
            "invalid {} '{}', empty from",
            kind, item
        )));
    }
    Ok((from_value, to_value.trim()))
}

/// Parse `--map from=to` values.
pub fn parse_inline_mapping(values: &[String]) -> Result<Vec<PathMapping>, RerootError> {
    values
        .iter()
        .map(|item| split_pair(item, "mapping").map(|(from, to)| PathMapping::new(from, to)))
        .collect()
}

/// Parse `--replace from=to` values.
pub fn parse_inline_replacement(values: &[String]) -> Result<Vec<Replacement>, RerootError> {
    values
        .iter()
        .map(|item| split_pair(item, "replacement").map(|(from, to)| Replacement::new(from, to)))
        .collect()
}
