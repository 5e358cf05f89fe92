//! cache::digest
//!
//! Content verification by SHA-256.
//!
//! Files are streamed through the hasher in fixed-size chunks, so verifying a
//! large payload never holds more than one chunk in memory.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;

use super::fs::FileSystem;

const CHUNK_SIZE: usize = 64 * 1024;

/// Errors from computing a file digest.
#[derive(Debug, Error)]
pub enum DigestError {
    /// The file does not exist.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Any other I/O failure while opening or reading.
    #[error("cannot hash '{path}': {source}")]
    Io {
        path: PathBuf,
        source: io::Error,
    },
}

impl DigestError {
    fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            DigestError::NotFound(path.to_path_buf())
        } else {
            DigestError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Compute the lowercase hex SHA-256 of a file.
///
/// # Errors
///
/// Returns [`DigestError::NotFound`] if the file is missing and
/// [`DigestError::Io`] for any other failure.
pub fn hash_file(fs: &dyn FileSystem, path: &Path) -> Result<String, DigestError> {
    let mut reader = fs.open(path).map_err(|e| DigestError::from_io(path, e))?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(DigestError::from_io(path, e)),
        };
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Compute the lowercase hex SHA-256 of in-memory content.
///
/// ```
/// use legacy_bridge::cache::digest::hash_bytes;
///
/// assert_eq!(
///     hash_bytes(b"abc"),
///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
/// );
/// ```
pub fn hash_bytes(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::fs::{FsOp, MemoryFileSystem};

    const HELLO: &str = "hello world\n";
    const HELLO_HASH: &str = "a948904f2f0f479b8f8197694b30184b0d2ed1c1cd2a1ec0fb85d299a192a447";

    #[test]
    fn hashes_file_content() {
        let fs = MemoryFileSystem::new();
        fs.insert_file("/f", HELLO);

        assert_eq!(hash_file(&fs, Path::new("/f")).unwrap(), HELLO_HASH);
    }

    #[test]
    fn matches_in_memory_hash() {
        assert_eq!(hash_bytes(HELLO.as_bytes()), HELLO_HASH);
    }

    #[test]
    fn streams_content_larger_than_one_chunk() {
        let fs = MemoryFileSystem::new();
        let content = vec![7u8; CHUNK_SIZE * 3 + 17];
        fs.insert_file("/big", content.clone());

        assert_eq!(
            hash_file(&fs, Path::new("/big")).unwrap(),
            hash_bytes(&content)
        );
    }

    #[test]
    fn missing_file_is_not_found() {
        let fs = MemoryFileSystem::new();
        let err = hash_file(&fs, Path::new("/absent")).unwrap_err();
        assert!(matches!(err, DigestError::NotFound(_)));
    }

    #[test]
    fn other_errors_are_io() {
        let fs = MemoryFileSystem::new();
        fs.insert_file("/f", HELLO);
        fs.fail_on(FsOp::Open, "/f", io::ErrorKind::PermissionDenied);

        let err = hash_file(&fs, Path::new("/f")).unwrap_err();
        assert!(matches!(err, DigestError::Io { .. }));
    }
}
