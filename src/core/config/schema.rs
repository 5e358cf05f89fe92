//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Layout
//!
//! ```toml
//! [application]
//! name = "Legacy Bridge CLI"
//! executable = "lbr"
//! slug = "legacy-bridge"
//! env_prefix = "LEGACY_CLI_"
//!
//! [wrapper]
//! github_repo = "acme/legacy-bridge"
//! update_check = true
//! cache_dir = "/var/cache/lbr"
//! ```
//!
//! # Validation
//!
//! Values are validated after parsing so that a bad slug can never leak into
//! a cache path and a malformed repository never reaches the release check.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Identity of the wrapped application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ApplicationConfig {
    /// Human-readable name, shown in headers and version output
    pub name: String,

    /// Name of the wrapper executable as users type it
    pub executable: String,

    /// Namespace used for the cache directory and project config directory
    pub slug: String,

    /// Prefix for environment variables handed to the legacy executable
    #[serde(default)]
    pub env_prefix: String,
}

impl ApplicationConfig {
    /// Validate the application identity.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "application.name cannot be empty".to_string(),
            ));
        }
        if self.executable.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "application.executable cannot be empty".to_string(),
            ));
        }
        if !is_valid_slug(&self.slug) {
            return Err(ConfigError::InvalidValue(format!(
                "invalid application.slug '{}': use letters, digits, '.', '_' or '-'",
                self.slug
            )));
        }
        Ok(())
    }
}

/// Wrapper behaviour settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WrapperConfig {
    /// GitHub repository (`owner/repo`) queried for new releases; empty disables
    pub github_repo: String,

    /// Whether to run the background release check
    pub update_check: Option<bool>,

    /// Override for the cache root (defaults to the platform user cache dir)
    pub cache_dir: Option<PathBuf>,
}

impl WrapperConfig {
    /// Validate the wrapper settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.github_repo.is_empty() {
            let valid = match self.github_repo.split_once('/') {
                Some((owner, repo)) => {
                    is_valid_slug(owner) && is_valid_slug(repo) && !repo.contains('/')
                }
                None => false,
            };
            if !valid {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid wrapper.github_repo '{}', expected 'owner/repo'",
                    self.github_repo
                )));
            }
        }

        if let Some(dir) = &self.cache_dir {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "wrapper.cache_dir cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value != "."
        && value != ".."
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}
