//! Content hashing for binary change detection

use crate::types::RerootError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const READ_CHUNK: usize = 64 * 1024;

/// Blake3 digest of a file, streamed in 64KB chunks.
pub fn compute_hash(file_path: &Path) -> Result<[u8; 32], RerootError> {
    let mut file = File::open(file_path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; READ_CHUNK];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(*hasher.finalize().as_bytes())
}

/// Whether `dest` exists with the same bytes as `src`.
///
/// Sizes are compared first; a missing destination is never identical.
pub fn files_identical(src: &Path, dest: &Path) -> Result<bool, RerootError> {
    let dest_meta = match std::fs::metadata(dest) {
        Ok(meta) if meta.is_file() => meta,
        Ok(_) => return Ok(false),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };
    if std::fs::metadata(src)?.len() != dest_meta.len() {
        return Ok(false);
    }
    Ok(compute_hash(src)? == compute_hash(dest)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_with(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_hash_is_deterministic() {
        let a = temp_with(b"\x89PNG\0\0payload");
        let b = temp_with(b"\x89PNG\0\0payload");
        assert_eq!(compute_hash(a.path()).unwrap(), compute_hash(b.path()).unwrap());
    }

    #[test]
    fn test_hash_matches_blake3_of_bytes() {
        let file = temp_with(b"");
        assert_eq!(
            compute_hash(file.path()).unwrap(),
            *blake3::hash(b"").as_bytes()
        );
    }

    #[test]
    fn test_hash_missing_file_is_io_error() {
        let result = compute_hash(Path::new("/nonexistent/logo.png"));
        assert!(matches!(result, Err(RerootError::Io(_))));
    }

    #[test]
    fn test_files_identical() {
        let a = temp_with(b"same bytes");
        let b = temp_with(b"same bytes");
        let c = temp_with(b"same bytez");
        let d = temp_with(b"shorter");

        assert!(files_identical(a.path(), b.path()).unwrap());
        assert!(!files_identical(a.path(), c.path()).unwrap());
        assert!(!files_identical(a.path(), d.path()).unwrap());
        assert!(!files_identical(a.path(), Path::new("/nonexistent/x.bin")).unwrap());
    }
}
