//! Atomic writes for the destination tree

use crate::types::RerootError;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const PART_SUFFIX: &str = ".rerooter.part";
const COPY_BUFFER: usize = 128 * 1024;

/// Sibling temp path: `logo.png` -> `logo.png.rerooter.part`
pub fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(PART_SUFFIX);
    dest.with_file_name(name)
}

/// Copy a binary file byte-for-byte.
///
/// Streams into a `.part` sibling, syncs it, carries over permissions and
/// mtime, then renames over `dest`. Parent directories are created. Returns
/// the number of bytes copied.
pub fn copy_file_atomic(src: &Path, dest: &Path) -> Result<u64, RerootError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let part = part_path(dest);

    let result = (|| -> Result<u64, RerootError> {
        let mut src_file = File::open(src)?;
        let mut part_file = File::create(&part)?;
        let mut buffer = vec![0u8; COPY_BUFFER];
        let mut total_bytes = 0u64;

        loop {
            let bytes_read = src_file.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            part_file.write_all(&buffer[..bytes_read])?;
            total_bytes += bytes_read as u64;
        }
        part_file.sync_all()?;
        // handle must be closed before the rename on Windows
        drop(part_file);

        let src_metadata = fs::metadata(src)?;
        fs::set_permissions(&part, src_metadata.permissions())?;
        let mtime = filetime::FileTime::from_last_modification_time(&src_metadata);
        filetime::set_file_mtime(&part, mtime)?;

        fs::rename(&part, dest)?;
        Ok(total_bytes)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&part);
    }
    result
}

/// Replace `dest` with `bytes` through a `.part` sibling.
///
/// The parent directory must already exist.
pub fn write_bytes_atomic(dest: &Path, bytes: &[u8]) -> Result<(), RerootError> {
    let part = part_path(dest);

    let result = (|| -> Result<(), RerootError> {
        let mut part_file = File::create(&part)?;
        part_file.write_all(bytes)?;
        part_file.sync_all()?;
        drop(part_file);
        fs::rename(&part, dest)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&part);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_part_path_keeps_extension() {
        assert_eq!(
            part_path(Path::new("/dst/img/logo.png")),
            PathBuf::from("/dst/img/logo.png.rerooter.part")
        );
    }

    #[test]
    fn test_copy_creates_parents_and_preserves_mtime() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let src = temp.path().join("logo.png");
        let dest = temp.path().join("out/nested/logo.png");
        fs::write(&src, [0x89, b'P', b'N', b'G', 0, 1, 2]).unwrap();
        let stamp = filetime::FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&src, stamp).unwrap();

        let bytes = copy_file_atomic(&src, &dest).unwrap();

        assert_eq!(bytes, 7);
        assert_eq!(fs::read(&dest).unwrap(), fs::read(&src).unwrap());
        let copied = filetime::FileTime::from_last_modification_time(&fs::metadata(&dest).unwrap());
        assert_eq!(copied.unix_seconds(), 1_600_000_000);
        assert!(!part_path(&dest).exists());
    }

    #[test]
    fn test_copy_missing_source_leaves_no_part_file() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let dest = temp.path().join("out.bin");

        let result = copy_file_atomic(&temp.path().join("missing.bin"), &dest);

        assert!(result.is_err());
        assert!(!dest.exists());
        assert!(!part_path(&dest).exists());
    }

    #[test]
    fn test_write_bytes_replaces_existing() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let dest = temp.path().join("app.py");
        fs::write(&dest, b"old").unwrap();

        write_bytes_atomic(&dest, b"new content").unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"new content");
        assert!(!part_path(&dest).exists());
    }
}
