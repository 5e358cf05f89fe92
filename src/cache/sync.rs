//! cache::sync
//!
//! Write-if-changed for cached files.
//!
//! # Algorithm
//!
//! ```text
//! stat ──absent / size differs──────────────────────────► write + sidecar
//!   │
//!   └─size matches─► sidecar hash, else computed hash
//!                        │
//!                        ├─ equals desired ──► Current (no write)
//!                        ├─ differs ─────────► write + sidecar
//!                        ├─ file vanished ───► write + sidecar
//!                        └─ other failure ───► error (no write)
//! ```
//!
//! # Invariants
//!
//! - A stat or hash failure other than "not found" never triggers a write.
//!   An inconclusive check is reported, not papered over with a rewrite.
//! - A trusted sidecar is never re-verified against the bytes on disk.
//! - After a failed write, the next call detects the file as stale: a failed
//!   content write leaves a size (or hash) mismatch, and a failed sidecar save
//!   leaves no sidecar vouching for the new content.
//! - Concurrent writers with the same content and hash converge; there is no
//!   lock and a reader may observe a partially written file in between.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use super::digest::{hash_file, DigestError};
use super::fs::FileSystem;
use super::hash_store::{HashStore, HashStoreError};

/// Errors from [`SyncWriter::ensure`].
#[derive(Debug, Error)]
pub enum SyncError {
    /// The destination could not be stat'ed for a reason other than absence.
    #[error("could not stat '{path}': {source}")]
    Stat {
        path: PathBuf,
        source: io::Error,
    },

    /// The destination's hash could not be determined.
    #[error("could not verify '{path}': {source}")]
    Verify {
        path: PathBuf,
        source: DigestError,
    },

    /// Writing the content failed.
    #[error("could not write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: io::Error,
    },

    /// Writing the hash sidecar failed.
    #[error(transparent)]
    Sidecar(#[from] HashStoreError),
}

/// What [`SyncWriter::ensure`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The destination already matched; nothing was written.
    Current,
    /// The destination was (re)written along with its sidecar.
    Written,
}

/// Writes desired content to a destination only when it differs.
#[derive(Debug, Clone)]
pub struct SyncWriter {
    fs: Arc<dyn FileSystem>,
    hashes: HashStore,
}

impl SyncWriter {
    /// Create a writer on the given filesystem.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        let hashes = HashStore::new(Arc::clone(&fs));
        Self { fs, hashes }
    }

    /// Make `destination` hold `content`, whose SHA-256 is `desired_hash`.
    ///
    /// # Errors
    ///
    /// See [`SyncError`]. No write is attempted after a `Stat` or `Verify`
    /// error.
    pub fn ensure(
        &self,
        destination: &Path,
        content: &[u8],
        desired_hash: &str,
    ) -> Result<SyncOutcome, SyncError> {
        if self.is_current(destination, content.len() as u64, desired_hash)? {
            return Ok(SyncOutcome::Current);
        }

        self.fs
            .write(destination, content)
            .map_err(|source| SyncError::Write {
                path: destination.to_path_buf(),
                source,
            })?;
        self.hashes.save_hash(destination, desired_hash)?;

        Ok(SyncOutcome::Written)
    }

    /// Check whether `destination` already has the expected size and hash.
    fn is_current(
        &self,
        destination: &Path,
        expected_len: u64,
        desired_hash: &str,
    ) -> Result<bool, SyncError> {
        let stat = match self.fs.metadata(destination) {
            Ok(stat) => stat,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(source) => {
                return Err(SyncError::Stat {
                    path: destination.to_path_buf(),
                    source,
                })
            }
        };

        if stat.len != expected_len {
            return Ok(false);
        }

        if let Some(trusted) = self.hashes.read_trusted_hash(destination) {
            return Ok(trusted == desired_hash);
        }

        match hash_file(self.fs.as_ref(), destination) {
            Ok(actual) => Ok(actual == desired_hash),
            Err(DigestError::NotFound(_)) => Ok(false),
            Err(source) => Err(SyncError::Verify {
                path: destination.to_path_buf(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::digest::hash_bytes;
    use crate::cache::fs::{FsOp, MemoryFileSystem};

    const DEST: &str = "/cache/app/legacy";
    const SIDECAR: &str = "/cache/app/legacy.sha256";

    fn writer() -> (MemoryFileSystem, SyncWriter) {
        let fs = MemoryFileSystem::new();
        let writer = SyncWriter::new(Arc::new(fs.clone()));
        (fs, writer)
    }

    fn dest() -> &'static Path {
        Path::new(DEST)
    }

    fn sidecar() -> &'static Path {
        Path::new(SIDECAR)
    }

    #[test]
    fn absent_destination_is_written_with_sidecar() {
        let (fs, writer) = writer();
        let hash = hash_bytes(b"abc");

        let outcome = writer.ensure(dest(), b"abc", &hash).unwrap();

        assert_eq!(outcome, SyncOutcome::Written);
        assert_eq!(fs.contents(dest()), Some(b"abc".to_vec()));
        assert_eq!(fs.contents(sidecar()), Some(hash.into_bytes()));
    }

    #[test]
    fn second_call_is_a_no_op() {
        let (fs, writer) = writer();
        let hash = hash_bytes(b"abc");

        writer.ensure(dest(), b"abc", &hash).unwrap();
        let writes_after_first = fs.total_writes();
        let outcome = writer.ensure(dest(), b"abc", &hash).unwrap();

        assert_eq!(outcome, SyncOutcome::Current);
        assert_eq!(fs.total_writes(), writes_after_first);
        assert_eq!(fs.write_count(dest()), 1);
        assert_eq!(fs.write_count(sidecar()), 1);
    }

    #[test]
    fn size_mismatch_rewrites_despite_matching_sidecar() {
        let (fs, writer) = writer();
        let hash = hash_bytes(b"abc");
        fs.insert_file(DEST, "abcd");
        fs.insert_file(SIDECAR, hash.clone());

        let outcome = writer.ensure(dest(), b"abc", &hash).unwrap();

        assert_eq!(outcome, SyncOutcome::Written);
        assert_eq!(fs.contents(dest()), Some(b"abc".to_vec()));
    }

    #[test]
    fn same_size_different_bytes_without_sidecar_rewrites() {
        let (fs, writer) = writer();
        fs.insert_file(DEST, "xyz");

        let outcome = writer.ensure(dest(), b"abc", &hash_bytes(b"abc")).unwrap();

        assert_eq!(outcome, SyncOutcome::Written);
        assert_eq!(fs.contents(dest()), Some(b"abc".to_vec()));
    }

    #[test]
    fn same_bytes_without_sidecar_is_current() {
        let (fs, writer) = writer();
        fs.insert_file(DEST, "abc");

        let outcome = writer.ensure(dest(), b"abc", &hash_bytes(b"abc")).unwrap();

        assert_eq!(outcome, SyncOutcome::Current);
        assert_eq!(fs.total_writes(), 0);
        // Computed, not trusted: no sidecar is created on a match
        assert!(!fs.exists(sidecar()));
    }

    #[test]
    fn matching_sidecar_is_trusted_over_corrupted_bytes() {
        let (fs, writer) = writer();
        let hash = hash_bytes(b"abc");
        fs.insert_file(DEST, "xyz");
        fs.insert_file(SIDECAR, hash.clone());

        let outcome = writer.ensure(dest(), b"abc", &hash).unwrap();

        assert_eq!(outcome, SyncOutcome::Current);
        assert_eq!(fs.contents(dest()), Some(b"xyz".to_vec()));
        assert_eq!(fs.read_count(dest()), 0, "payload must not be rehashed");
    }

    #[test]
    fn stale_sidecar_triggers_rewrite() {
        let (fs, writer) = writer();
        fs.insert_file(DEST, "abc");
        fs.insert_file(SIDECAR, hash_bytes(b"old"));

        let outcome = writer.ensure(dest(), b"abc", &hash_bytes(b"abc")).unwrap();

        assert_eq!(outcome, SyncOutcome::Written);
        assert_eq!(fs.contents(sidecar()), Some(hash_bytes(b"abc").into_bytes()));
    }

    #[test]
    fn stat_error_aborts_without_writing() {
        let (fs, writer) = writer();
        fs.fail_on(FsOp::Metadata, DEST, io::ErrorKind::PermissionDenied);

        let err = writer
            .ensure(dest(), b"abc", &hash_bytes(b"abc"))
            .unwrap_err();

        assert!(matches!(err, SyncError::Stat { .. }));
        assert_eq!(fs.total_writes(), 0);
    }

    #[test]
    fn hash_error_aborts_without_writing() {
        let (fs, writer) = writer();
        fs.insert_file(DEST, "xyz");
        fs.fail_on(FsOp::Open, DEST, io::ErrorKind::PermissionDenied);

        let err = writer
            .ensure(dest(), b"abc", &hash_bytes(b"abc"))
            .unwrap_err();

        assert!(matches!(err, SyncError::Verify { .. }));
        assert_eq!(fs.total_writes(), 0);
    }

    #[test]
    fn file_vanishing_before_hash_is_stale() {
        let (fs, writer) = writer();
        fs.insert_file(DEST, "xyz");
        fs.fail_on(FsOp::Open, DEST, io::ErrorKind::NotFound);

        let outcome = writer.ensure(dest(), b"abc", &hash_bytes(b"abc")).unwrap();

        assert_eq!(outcome, SyncOutcome::Written);
    }

    #[test]
    fn failed_content_write_is_redetected() {
        let (fs, writer) = writer();
        let hash = hash_bytes(b"abc");
        fs.fail_on(FsOp::Write, DEST, io::ErrorKind::Other);

        let err = writer.ensure(dest(), b"abc", &hash).unwrap_err();
        assert!(matches!(err, SyncError::Write { .. }));
        assert!(!fs.exists(sidecar()));

        fs.clear_failures();
        let outcome = writer.ensure(dest(), b"abc", &hash).unwrap();
        assert_eq!(outcome, SyncOutcome::Written);
    }

    #[test]
    fn failed_sidecar_save_is_redetected() {
        let (fs, writer) = writer();
        let old = hash_bytes(b"xyz");
        let hash = hash_bytes(b"abc");
        fs.insert_file(DEST, "xyz");
        fs.insert_file(SIDECAR, old.clone());
        fs.fail_on(FsOp::Rename, SIDECAR, io::ErrorKind::PermissionDenied);

        let err = writer.ensure(dest(), b"abc", &hash).unwrap_err();
        assert!(matches!(err, SyncError::Sidecar(_)));
        // Content is new but the sidecar still vouches for the old digest
        assert_eq!(fs.contents(dest()), Some(b"abc".to_vec()));
        assert_eq!(fs.contents(sidecar()), Some(old.into_bytes()));

        fs.clear_failures();
        let outcome = writer.ensure(dest(), b"abc", &hash).unwrap();
        assert_eq!(outcome, SyncOutcome::Written);
        assert_eq!(fs.contents(sidecar()), Some(hash.into_bytes()));
    }

    #[test]
    fn content_change_writes_exactly_once() {
        let (fs, writer) = writer();
        let v1 = hash_bytes(b"version one");
        let v2 = hash_bytes(b"version two!");

        writer.ensure(dest(), b"version one", &v1).unwrap();
        writer.ensure(dest(), b"version two!", &v2).unwrap();
        writer.ensure(dest(), b"version two!", &v2).unwrap();

        assert_eq!(fs.write_count(dest()), 2);
        assert_eq!(fs.write_count(sidecar()), 2);
        assert_eq!(fs.contents(dest()), Some(b"version two!".to_vec()));
    }
}
