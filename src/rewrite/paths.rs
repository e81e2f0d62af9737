//! Lexical path arithmetic for reference rebasing
//!
//! Nothing here touches the filesystem beyond `std::path::absolute`: `..` is
//! collapsed textually and symlinks are not resolved, so the same inputs always
//! give the same outputs whether or not the files exist yet.

use crate::types::RerootError;
use std::path::{Component, Path, PathBuf};

/// Collapse `.` and `..` components without consulting the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        PathBuf::from(".")
    } else {
        out.iter().collect()
    }
}

/// Absolute, lexically normalized form of `path`.
pub fn absolutize(path: &Path) -> Result<PathBuf, RerootError> {
    Ok(normalize_lexically(&std::path::absolute(path)?))
}

/// Path of `target` relative to the directory `base_dir`.
///
/// Both inputs should be absolute and normalized. When they share no root
/// (different drives) `target` is returned unchanged.
pub fn relative_to(target: &Path, base_dir: &Path) -> PathBuf {
    let target_parts: Vec<Component<'_>> = target.components().collect();
    let base_parts: Vec<Component<'_>> = base_dir.components().collect();

    let common = target_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();
    if common == 0 {
        return target.to_path_buf();
    }

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &target_parts[common..] {
        relative.push(part);
    }

    if relative.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        relative
    }
}

/// Join the components of a relative path with `\`.
pub fn to_backslashes(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("\\")
}
