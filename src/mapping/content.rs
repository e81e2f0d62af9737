//! Content rule selection

use super::lowercase_extension;
use crate::config::{ContentRule, PathMapping, Replacement};
use crate::scanner::GlobPattern;
use crate::types::RerootError;
use camino::Utf8Path;
use std::collections::HashSet;

/// A content rule with its glob compiled once per run
#[derive(Debug, Clone)]
pub struct CompiledRule {
    glob: GlobPattern,
    extensions: Vec<String>,
    replacements: Vec<Replacement>,
}

impl CompiledRule {
    pub fn new(rule: &ContentRule) -> Result<Self, RerootError> {
        Ok(Self {
            glob: GlobPattern::new(&rule.path_glob)?,
            extensions: rule.extensions.clone(),
            replacements: rule.replacements.clone(),
        })
    }

    pub fn compile_all(rules: &[ContentRule]) -> Result<Vec<Self>, RerootError> {
        rules.iter().map(Self::new).collect()
    }

    /// Extension filter first, then the path glob.
    pub fn applies_to(&self, relative_path: &Utf8Path) -> bool {
        if !self.extensions.is_empty()
            && !self.extensions.contains(&lowercase_extension(relative_path))
        {
            return false;
        }
        self.glob.matches(relative_path)
    }

    pub fn replacements(&self) -> &[Replacement] {
        &self.replacements
    }
}

/// Concatenate the replacements of every applicable rule, in rule order.
///
/// With `reverse`, each replacement is swapped before concatenation.
pub fn select_replacements(
    relative_path: &Utf8Path,
    rules: &[CompiledRule],
    reverse: bool,
) -> Vec<Replacement> {
    let mut selected = Vec::new();
    for rule in rules.iter().filter(|rule| rule.applies_to(relative_path)) {
        if reverse {
            selected.extend(rule.replacements().iter().map(Replacement::reversed));
        } else {
            selected.extend(rule.replacements().iter().cloned());
        }
    }
    selected
}

/// Every path mapping doubles as a literal content replacement.
pub fn mapping_replacements(mappings: &[PathMapping], reverse: bool) -> Vec<Replacement> {
    mappings
        .iter()
        .map(|mapping| mapping.as_replacement(reverse))
        .collect()
}

/// `primary` then `fallback`, dropping repeated `(from, to)` pairs; first occurrence wins.
pub fn merge_replacements(primary: Vec<Replacement>, fallback: Vec<Replacement>) -> Vec<Replacement> {
    let mut seen: HashSet<Replacement> = HashSet::new();
    let mut merged = Vec::with_capacity(primary.len() + fallback.len());
    for item in primary.into_iter().chain(fallback) {
        if seen.insert(item.clone()) {
            merged.push(item);
        }
    }
    merged
}
