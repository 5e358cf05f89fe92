//! cache::hash_store
//!
//! Hash sidecar storage.
//!
//! # Trust
//!
//! A sidecar (`<file>.sha256`) records the digest written alongside its file.
//! When present it is taken as the file's hash without rehashing. Nothing
//! checks the sidecar against the actual bytes, so a file altered after its
//! sidecar was written is still reported under the recorded digest.
//!
//! # Atomicity
//!
//! Sidecars are replaced by writing a uniquely named temporary sibling and
//! renaming it into place. A reader sees either the old digest or the new one,
//! never a prefix of one.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use super::fs::FileSystem;
use crate::core::paths::CachePaths;

/// Errors from saving a sidecar.
#[derive(Debug, Error)]
pub enum HashStoreError {
    #[error("cannot write hash sidecar '{path}': {source}")]
    Write {
        path: PathBuf,
        source: io::Error,
    },

    #[error("cannot replace hash sidecar '{path}': {source}")]
    Replace {
        path: PathBuf,
        source: io::Error,
    },
}

/// Reads and writes hash sidecars through a [`FileSystem`].
#[derive(Debug, Clone)]
pub struct HashStore {
    fs: Arc<dyn FileSystem>,
}

impl HashStore {
    /// Create a store on the given filesystem.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Read the trusted hash recorded for `path`.
    ///
    /// Any failure, including a missing or non-UTF-8 sidecar, yields `None`.
    pub fn read_trusted_hash(&self, path: &Path) -> Option<String> {
        let sidecar = CachePaths::sidecar_path(path);
        let mut reader = self.fs.open(&sidecar).ok()?;
        let mut contents = String::new();
        reader.read_to_string(&mut contents).ok()?;
        Some(contents.trim().to_string())
    }

    /// Record `digest` as the trusted hash for `path`.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures. A failed rename removes the temporary file.
    pub fn save_hash(&self, path: &Path, digest: &str) -> Result<(), HashStoreError> {
        let sidecar = CachePaths::sidecar_path(path);
        let temp = temp_path(&sidecar);

        self.fs
            .write(&temp, digest.as_bytes())
            .map_err(|source| HashStoreError::Write {
                path: temp.clone(),
                source,
            })?;

        if let Err(source) = self.fs.rename(&temp, &sidecar) {
            let _ = self.fs.remove(&temp);
            return Err(HashStoreError::Replace {
                path: sidecar,
                source,
            });
        }

        Ok(())
    }
}

/// Temporary sibling for `sidecar`, unique per call.
fn temp_path(sidecar: &Path) -> PathBuf {
    let mut name = sidecar.as_os_str().to_os_string();
    name.push(format!(".{}.tmp", uuid::Uuid::new_v4().simple()));
    PathBuf::from(name)
}
