//! Content checksums using SHA-256
//!
//! The tracking store keys change detection on a digest of file bytes, so
//! the hash must be collision-resistant: a spurious match would silently
//! skip a changed file forever. Files are hashed in fixed-size chunks to
//! keep memory flat regardless of document size.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Read buffer size for streaming file hashes
const CHUNK_SIZE: usize = 64 * 1024;

/// Compute the hex-encoded SHA-256 digest of a file's contents.
///
/// Reads the file in 64 KiB chunks; memory use is constant in file size.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Compute the hex-encoded SHA-256 digest of an in-memory buffer.
pub fn hash_bytes(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_hash_bytes_deterministic() {
        let data = b"Hello, World!";
        let hash = hash_bytes(data);

        // SHA-256 = 32 bytes = 64 hex chars
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_bytes(data));
        assert_ne!(hash, hash_bytes(b"Hello, World?"));
    }

    #[test]
    fn test_hash_file_matches_hash_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        fs::write(&path, b"some document bytes").unwrap();

        assert_eq!(hash_file(&path).unwrap(), hash_bytes(b"some document bytes"));
    }

    #[test]
    fn test_hash_file_larger_than_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.pdf");
        let data = vec![0xABu8; CHUNK_SIZE * 3 + 17];
        fs::write(&path, &data).unwrap();

        assert_eq!(hash_file(&path).unwrap(), hash_bytes(&data));
    }

    #[test]
    fn test_hash_missing_file() {
        assert!(hash_file(Path::new("/nonexistent/file.pdf")).is_err());
    }
}
