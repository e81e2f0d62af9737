//! Source tree walker

use crate::types::RerootError;
use camino::Utf8PathBuf;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// A regular file found under the walked root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path on disk
    pub abs: PathBuf,

    /// Path relative to the root, `/`-separated on every platform
    pub rel: Utf8PathBuf,
}

/// Collect every regular file under `root_path`, sorted by full path.
///
/// Nothing is filtered here: hidden files, `.git` and ignore files are all
/// returned so the planner can apply its own rules in its own order. Entries
/// that cannot be read, or whose relative path is not valid UTF-8, are logged
/// and skipped.
pub fn collect_files(root_path: &Path) -> Result<Vec<SourceFile>, RerootError> {
    if !root_path.is_dir() {
        return Err(RerootError::Validation(format!(
            "Source path is not a directory: {}",
            root_path.display()
        )));
    }

    let walker = ignore::WalkBuilder::new(root_path)
        .standard_filters(false)
        .follow_links(false)
        .build();

    let mut paths: Vec<PathBuf> = Vec::new();
    for result in walker {
        match result {
            Ok(entry) => {
                // Symlinks count when they point at a regular file
                if entry.path().is_file() {
                    paths.push(entry.into_path());
                }
            }
            Err(e) => {
                warn!("Error during directory traversal: {}. Continuing with remaining files.", e);
            }
        }
    }
    paths.sort();

    let mut files = Vec::with_capacity(paths.len());
    for abs in paths {
        let rel = match abs.strip_prefix(root_path) {
            Ok(p) => p,
            Err(_) => {
                warn!("Failed to calculate relative path for {}; skipped", abs.display());
                continue;
            }
        };
        match to_posix(rel) {
            Some(rel) => files.push(SourceFile { abs, rel }),
            None => warn!("Non UTF-8 path skipped: {}", abs.display()),
        }
    }

    Ok(files)
}

/// Join normal components with `/`.
fn to_posix(path: &Path) -> Option<Utf8PathBuf> {
    let mut parts: Vec<&str> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(Utf8PathBuf::from(parts.join("/")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_collect_empty_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let files = collect_files(temp_dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_collect_sorted_nested_and_hidden() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        fs::create_dir_all(root.join("b/inner")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("b/inner/z.txt"), "z").unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join(".gitignore"), "*.log").unwrap();
        fs::write(root.join(".git/HEAD"), "ref").unwrap();
        fs::write(root.join("c.log"), "log").unwrap();

        let rels: Vec<String> = collect_files(root)
            .unwrap()
            .into_iter()
            .map(|f| f.rel.to_string())
            .collect();

        assert_eq!(
            rels,
            vec![".git/HEAD", ".gitignore", "a.txt", "b/inner/z.txt", "c.log"]
        );
    }

    #[test]
    fn test_collect_absolute_paths() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join("one.py"), "x = 1").unwrap();

        let files = collect_files(temp_dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].abs, temp_dir.path().join("one.py"));
        assert_eq!(files[0].rel.as_str(), "one.py");
    }

    #[test]
    fn test_collect_rejects_missing_root() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let result = collect_files(&temp_dir.path().join("missing"));
        assert!(matches!(result, Err(RerootError::Validation(_))));
    }
}
