//! legacy::payload
//!
//! The legacy executable bundled into the wrapper.
//!
//! `build.rs` copies the payload into `OUT_DIR` and records its SHA-256 and
//! the legacy version, so the bytes and their hash are fixed at build time.

use std::borrow::Cow;

/// File name of the payload inside the cache directory.
pub const PAYLOAD_FILE_NAME: &str = "legacy-cli";

static EMBEDDED_BYTES: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/legacy-payload"));
const EMBEDDED_SHA256: &str = env!("LBR_PAYLOAD_SHA256");
const EMBEDDED_VERSION: &str = env!("LBR_LEGACY_VERSION");

/// A deployable legacy executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// File name inside the cache directory.
    pub file_name: Cow<'static, str>,
    /// Executable content.
    pub bytes: Cow<'static, [u8]>,
    /// Lowercase hex SHA-256 of `bytes`.
    pub sha256: Cow<'static, str>,
    /// Version of the legacy tool.
    pub version: Cow<'static, str>,
}

impl Payload {
    /// The payload compiled into this binary.
    pub fn embedded() -> Self {
        Self {
            file_name: Cow::Borrowed(PAYLOAD_FILE_NAME),
            bytes: Cow::Borrowed(EMBEDDED_BYTES),
            sha256: Cow::Borrowed(EMBEDDED_SHA256),
            version: Cow::Borrowed(EMBEDDED_VERSION),
        }
    }

    /// A payload built at runtime, hashing `bytes`.
    pub fn from_bytes(file_name: &str, bytes: Vec<u8>, version: &str) -> Self {
        let sha256 = crate::cache::digest::hash_bytes(&bytes);
        Self {
            file_name: Cow::Owned(file_name.to_string()),
            bytes: Cow::Owned(bytes),
            sha256: Cow::Owned(sha256),
            version: Cow::Owned(version.to_string()),
        }
    }

    /// Length of the payload in bytes.
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
