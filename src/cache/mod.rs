//! cache
//!
//! Content-verified deployment cache for the legacy payload.
//!
//! # Modules
//!
//! - [`fs`] - Filesystem capability and its in-memory double
//! - [`digest`] - Streaming SHA-256 of files
//! - [`hash_store`] - Hash sidecars (`<file>.sha256`)
//! - [`sync`] - Write-if-changed algorithm
//!
//! # Lifecycle
//!
//! Every invocation that needs the legacy executable calls
//! [`DeploymentCache::ensure_payload`] first. The payload is written only
//! when the cached copy is missing, has the wrong size, or hashes differently.
//! Cached files are never deleted here.
//!
//! # Example
//!
//! ```
//! use legacy_bridge::cache::{fs::MemoryFileSystem, DeploymentCache};
//! use legacy_bridge::core::paths::CachePaths;
//! use legacy_bridge::legacy::payload::Payload;
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! let fs = MemoryFileSystem::new();
//! let cache = DeploymentCache::new(
//!     Arc::new(fs.clone()),
//!     CachePaths::new(PathBuf::from("/cache"), "app"),
//! );
//! let payload = Payload::from_bytes("tool", b"#!/bin/sh\n".to_vec(), "1.0.0");
//!
//! let deployed = cache.ensure_payload(&payload).unwrap();
//! assert_eq!(deployed.file.path, PathBuf::from("/cache/app/tool"));
//! assert!(fs.is_executable(&deployed.file.path));
//! ```

pub mod digest;
pub mod fs;
pub mod hash_store;
pub mod sync;

pub use fs::{FileSystem, MemoryFileSystem, OsFileSystem};
pub use sync::{SyncError, SyncOutcome, SyncWriter};

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::core::paths::CachePaths;
use crate::legacy::payload::Payload;

/// Errors from materializing the payload.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cannot create cache directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        source: io::Error,
    },

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("cannot make '{path}' executable: {source}")]
    Permissions {
        path: PathBuf,
        source: io::Error,
    },
}

/// A file the cache keeps byte-identical to a known content.
///
/// Valid iff the file at `path` exists, is `expected_size` bytes long, and
/// hashes (or has a trusted sidecar) equal to `expected_hash`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedFile {
    pub path: PathBuf,
    pub expected_size: u64,
    pub expected_hash: String,
}

impl CachedFile {
    /// Path of this file's hash sidecar.
    pub fn sidecar_path(&self) -> PathBuf {
        CachePaths::sidecar_path(&self.path)
    }
}

/// Result of [`DeploymentCache::ensure_payload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub file: CachedFile,
    pub outcome: SyncOutcome,
}

/// Owns the cache directory and keeps the payload current inside it.
#[derive(Debug, Clone)]
pub struct DeploymentCache {
    fs: Arc<dyn FileSystem>,
    paths: CachePaths,
    writer: SyncWriter,
}

impl DeploymentCache {
    /// Create a cache rooted at `paths` on the given filesystem.
    pub fn new(fs: Arc<dyn FileSystem>, paths: CachePaths) -> Self {
        let writer = SyncWriter::new(Arc::clone(&fs));
        Self { fs, paths, writer }
    }

    /// Path routing used by this cache.
    pub fn paths(&self) -> &CachePaths {
        &self.paths
    }

    /// Describe where `payload` lives once deployed.
    pub fn cached_file(&self, payload: &Payload) -> CachedFile {
        CachedFile {
            path: self.paths.payload_path(&payload.file_name),
            expected_size: payload.len(),
            expected_hash: payload.sha256.to_string(),
        }
    }

    /// Make sure the cached payload is present and current.
    ///
    /// Creates the cache directory (with parents) if needed, writes the
    /// payload when it is stale, and makes it executable.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, if the cached copy
    /// cannot be verified or written, or if permissions cannot be set.
    pub fn ensure_payload(&self, payload: &Payload) -> Result<Deployment, CacheError> {
        let dir = self.paths.cache_dir();
        self.fs
            .create_dir_all(&dir)
            .map_err(|source| CacheError::CreateDir { path: dir, source })?;

        let file = self.cached_file(payload);
        let outcome = self
            .writer
            .ensure(&file.path, &payload.bytes, &file.expected_hash)?;

        self.fs
            .make_executable(&file.path)
            .map_err(|source| CacheError::Permissions {
                path: file.path.clone(),
                source,
            })?;

        Ok(Deployment { file, outcome })
    }
}
