//! core::config
//!
//! Configuration schema and loading.
//!
//! # Sources
//!
//! A default configuration is embedded into the binary at build time from
//! `config/default.toml`. Distributors that rebrand the wrapper either edit
//! that file before building or point `--config <path>` at a replacement.
//! There is no layering: an override file replaces the embedded defaults as
//! a whole, which keeps the application identity in one place.
//!
//! The loaded `Config` is passed explicitly to every component that needs it.
//! Nothing reads configuration from global state.
//!
//! # Example
//!
//! ```
//! use legacy_bridge::core::config::Config;
//!
//! let config = Config::embedded().unwrap();
//! assert_eq!(config.application.executable, "lbr");
//! assert!(!config.update_check_enabled());
//! ```

pub mod schema;

pub use schema::{ApplicationConfig, WrapperConfig};

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration embedded at build time.
const EMBEDDED_CONFIG: &str = include_str!("../../../config/default.toml");

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to parse embedded config: {0}")]
    EmbeddedParseError(String),

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Wrapper configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Identity of the wrapped application
    pub application: ApplicationConfig,

    /// Wrapper behaviour
    #[serde(default)]
    pub wrapper: WrapperConfig,
}

impl Config {
    /// Load configuration, preferring `override_path` over the embedded defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the override file cannot be read or parsed, or if
    /// the resulting configuration fails validation.
    pub fn load(override_path: Option<&Path>) -> Result<Self, ConfigError> {
        match override_path {
            Some(path) => Self::from_file(path),
            None => Self::embedded(),
        }
    }

    /// Parse the configuration embedded in the binary.
    pub fn embedded() -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(EMBEDDED_CONFIG)
            .map_err(|e| ConfigError::EmbeddedParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.application.validate()?;
        self.wrapper.validate()?;
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Check if the background release check should run.
    ///
    /// Requires a configured repository; defaults to `true` when one is set.
    pub fn update_check_enabled(&self) -> bool {
        !self.wrapper.github_repo.is_empty() && self.wrapper.update_check.unwrap_or(true)
    }

    /// Name of an environment variable handed to the legacy executable.
    ///
    /// ```
    /// use legacy_bridge::core::config::Config;
    ///
    /// let config = Config::embedded().unwrap();
    /// assert_eq!(config.env_var("WRAPPED"), "LEGACY_CLI_WRAPPED");
    /// ```
    pub fn env_var(&self, suffix: &str) -> String {
        format!("{}{}", self.application.env_prefix, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn embedded_config_is_valid() {
        let config = Config::embedded().unwrap();
        assert_eq!(config.application.slug, "legacy-bridge");
        assert!(config.wrapper.cache_dir.is_none());
    }

    #[test]
    fn load_without_override_uses_embedded() {
        let config = Config::load(None).unwrap();
        assert_eq!(config, Config::embedded().unwrap());
    }

    #[test]
    fn load_override_file() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");

        fs::write(
            &config_path,
            r#"
            [application]
            name = "Acme CLI"
            executable = "acme"
            slug = "acme-cli"
            env_prefix = "ACME_"

            [wrapper]
            github_repo = "acme/cli"
            cache_dir = "/tmp/acme-cache"
            "#,
        )
        .unwrap();

        let config = Config::load(Some(&config_path)).unwrap();

        assert_eq!(config.application.name, "Acme CLI");
        assert_eq!(
            config.wrapper.cache_dir.as_deref(),
            Some(Path::new("/tmp/acme-cache"))
        );
        assert!(config.update_check_enabled());
        assert_eq!(config.env_var("WRAPPED"), "ACME_WRAPPED");
    }

    #[test]
    fn update_check_can_be_disabled() {
        let mut config = Config::embedded().unwrap();
        config.wrapper.github_repo = "acme/cli".to_string();
        config.wrapper.update_check = Some(false);
        assert!(!config.update_check_enabled());
    }

    #[test]
    fn missing_file_is_read_error() {
        let temp = TempDir::new().unwrap();
        let err = Config::load(Some(&temp.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        fs::write(
            &config_path,
            r#"
            unknown_field = true

            [application]
            name = "Acme CLI"
            executable = "acme"
            slug = "acme"
            "#,
        )
        .unwrap();

        let err = Config::load(Some(&config_path)).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn invalid_slug_rejected() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        fs::write(
            &config_path,
            r#"
            [application]
            name = "Acme CLI"
            executable = "acme"
            slug = "acme/../../etc"
            "#,
        )
        .unwrap();

        let err = Config::load(Some(&config_path)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }
}
