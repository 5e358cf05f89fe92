//! core::paths
//!
//! Centralized path routing for wrapper storage locations.
//!
//! # Storage Layout
//!
//! All cached data lives under `<cache_root>/<slug>/`:
//! - `<payload-name>` - the materialized legacy executable
//! - `<payload-name>.sha256` - hash sidecar for the payload
//!
//! `<cache_root>` is the platform user cache directory (`dirs::cache_dir`)
//! unless the configuration overrides it. No code outside this module should
//! compute `*.join(slug)` paths.
//!
//! # Example
//!
//! ```
//! use legacy_bridge::core::paths::CachePaths;
//! use std::path::PathBuf;
//!
//! let paths = CachePaths::new(PathBuf::from("/home/u/.cache"), "legacy-bridge");
//!
//! assert_eq!(
//!     paths.payload_path("legacy-cli"),
//!     PathBuf::from("/home/u/.cache/legacy-bridge/legacy-cli")
//! );
//! ```

use std::path::{Path, PathBuf};

use crate::core::config::Config;

/// Extension appended to a file name to locate its hash sidecar.
pub const HASH_SIDECAR_EXT: &str = "sha256";

/// Path routing for the deployment cache.
///
/// # Invariants
///
/// - Every cached file lives directly under [`CachePaths::cache_dir`]
/// - The sidecar of `X` is always `X.sha256`, never a replaced extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePaths {
    /// Root of the user cache (shared by all applications).
    pub cache_root: PathBuf,

    /// Application namespace under the root.
    pub slug: String,
}

impl CachePaths {
    /// Create paths from an explicit cache root and slug.
    pub fn new(cache_root: PathBuf, slug: impl Into<String>) -> Self {
        Self {
            cache_root,
            slug: slug.into(),
        }
    }

    /// Resolve paths for the given configuration.
    ///
    /// Returns `None` if no cache root is configured and the platform has no
    /// user cache directory.
    pub fn from_config(config: &Config) -> Option<Self> {
        let root = match &config.wrapper.cache_dir {
            Some(dir) => dir.clone(),
            None => dirs::cache_dir()?,
        };
        Some(Self::new(root, config.application.slug.clone()))
    }

    /// Directory holding every cached file for this application.
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_root.join(&self.slug)
    }

    /// Path of a payload file inside the cache directory.
    pub fn payload_path(&self, file_name: &str) -> PathBuf {
        self.cache_dir().join(file_name)
    }

    /// Sidecar path holding the trusted hash for `path`.
    ///
    /// ```
    /// use legacy_bridge::core::paths::CachePaths;
    /// use std::path::{Path, PathBuf};
    ///
    /// assert_eq!(
    ///     CachePaths::sidecar_path(Path::new("/c/app/legacy.phar")),
    ///     PathBuf::from("/c/app/legacy.phar.sha256")
    /// );
    /// ```
    pub fn sidecar_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(".");
        name.push(HASH_SIDECAR_EXT);
        PathBuf::from(name)
    }
}
