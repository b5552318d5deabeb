use sha2::{Digest, Sha256};
use std::path::Path;

/// SHA-256 content digest of a file, hex-encoded. Used purely as an
/// equality fingerprint for change detection.
pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let content = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(format!("{:x}", hasher.finalize()))
}

/// SHA-256 digest of an in-memory string, hex-encoded.
pub fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_same_content_same_hash() {
        assert_eq!(hash_text("fn main() {}"), hash_text("fn main() {}"));
    }

    #[test]
    fn test_different_content_different_hash() {
        assert_ne!(hash_text("a"), hash_text("b"));
    }

    #[test]
    fn test_file_hash_matches_text_hash() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.rs");

        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"fn main() {}").unwrap();
        drop(file);

        assert_eq!(hash_file(&path).unwrap(), hash_text("fn main() {}"));
    }

    #[test]
    fn test_missing_file_errors() {
        assert!(hash_file(Path::new("/nonexistent/file.rs")).is_err());
    }
}
