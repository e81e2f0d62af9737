//! Binary/text classification

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Bytes sniffed for a NUL before a file is declared binary
pub const SNIFF_LEN: usize = 4096;

/// Known text extension, compared against the end of the lowercase file name
/// so compound entries such as `.razor.css` work.
pub fn has_text_extension(file_name: &str, text_extensions: &[String]) -> bool {
    let lower = file_name.to_lowercase();
    text_extensions.iter().any(|ext| lower.ends_with(ext.as_str()))
}

/// Known text extensions are text. Otherwise a non-empty prefix containing a
/// NUL byte is binary; an empty or NUL-free prefix is text. Unreadable files
/// are treated as binary so they are never decoded.
pub fn is_binary_file(path: &Path, text_extensions: &[String]) -> bool {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    if has_text_extension(&file_name, text_extensions) {
        return false;
    }

    let mut sample = Vec::with_capacity(SNIFF_LEN);
    let read = File::open(path).and_then(|file| file.take(SNIFF_LEN as u64).read_to_end(&mut sample));
    match read {
        Ok(_) => sample.contains(&0),
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use std::fs;
    use tempfile::TempDir;

    fn text_extensions() -> Vec<String> {
        AppConfig::default().text_extensions
    }

    #[test]
    fn test_known_extension_is_text_even_with_nul() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("odd.txt");
        fs::write(&path, b"a\0b").unwrap();
        assert!(!is_binary_file(&path, &text_extensions()));
    }

    #[test]
    fn test_nul_byte_makes_unknown_extension_binary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("image.png");
        fs::write(&path, [0x89, b'P', b'N', b'G', 0x00, 0x01]).unwrap();
        assert!(is_binary_file(&path, &text_extensions()));
    }

    #[test]
    fn test_unknown_extension_without_nul_is_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("script.sh");
        fs::write(&path, "#!/bin/sh\necho hi\n").unwrap();
        assert!(!is_binary_file(&path, &text_extensions()));
    }

    #[test]
    fn test_empty_file_is_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.bin");
        fs::write(&path, b"").unwrap();
        assert!(!is_binary_file(&path, &text_extensions()));
    }

    #[test]
    fn test_nul_after_sniff_window_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("late.dat");
        let mut content = vec![b'x'; SNIFF_LEN];
        content.push(0);
        fs::write(&path, content).unwrap();
        assert!(!is_binary_file(&path, &text_extensions()));
    }

    #[test]
    fn test_compound_extension() {
        let exts = text_extensions();
        assert!(has_text_extension("Site.Razor.CSS", &exts));
        assert!(!has_text_extension("site.css", &exts));
    }
}
