//! Model Artifact - integrity check
//!
//! The registry is only valid for the model it was derived from. Pinning the
//! artifact by SHA-256 catches a swapped model file before it serves.

use std::fs::File;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::logic::config::ConfigurationError;

/// Compute SHA256 hash of file, lowercase hex
pub fn compute_file_hash(path: &Path) -> Result<String, std::io::Error> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Compare the model file against an expected hex digest (case-insensitive)
pub fn verify_checksum(path: &Path, expected: &str) -> Result<(), ConfigurationError> {
    let actual = compute_file_hash(path).map_err(|source| ConfigurationError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let expected = expected.trim().to_lowercase();
    if actual != expected {
        return Err(ConfigurationError::ChecksumMismatch { expected, actual });
    }

    log::info!("Model checksum verified: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // sha256("abc")
    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    fn file_with(contents: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_compute_file_hash() {
        let file = file_with(b"abc");
        assert_eq!(compute_file_hash(file.path()).unwrap(), ABC_SHA256);
    }

    #[test]
    fn test_verify_checksum_accepts_uppercase() {
        let file = file_with(b"abc");
        assert!(verify_checksum(file.path(), &ABC_SHA256.to_uppercase()).is_ok());
    }

    #[test]
    fn test_verify_checksum_rejects_other_digest() {
        let file = file_with(b"abd");
        match verify_checksum(file.path(), ABC_SHA256) {
            Err(ConfigurationError::ChecksumMismatch { expected, actual }) => {
                assert_eq!(expected, ABC_SHA256);
                assert_ne!(actual, ABC_SHA256);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_verify_checksum_missing_file() {
        let result = verify_checksum(Path::new("/no/such/model.onnx"), ABC_SHA256);
        assert!(matches!(result, Err(ConfigurationError::Io { .. })));
    }
}
