//! legacy
//!
//! The wrapped legacy executable: where it lives and how to run it.
//!
//! # Modules
//!
//! - [`payload`] - Executable bytes and hash fixed at build time
//! - [`bridge`] - Child-process execution with exit-code propagation
//!
//! # Design
//!
//! [`LegacyCli::prepare`] resolves the executable once per invocation: either
//! a user-supplied local path, or the embedded payload materialized through
//! the [`DeploymentCache`]. The prepared handle then runs any number of
//! pass-through or capture executions against that path, each tagged with the
//! wrapper environment variables so the legacy tool knows it is wrapped.

pub mod bridge;
pub mod payload;

pub use bridge::{Bridge, BridgeError, Invocation};
pub use payload::Payload;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::cache::{CacheError, DeploymentCache, FileSystem, SyncOutcome};
use crate::core::config::Config;
use crate::core::paths::CachePaths;
use crate::ui::output::{self, Verbosity};

/// Errors from preparing the legacy executable.
#[derive(Debug, Error)]
pub enum LegacyError {
    #[error("no user cache directory available; set wrapper.cache_dir in the config")]
    NoCacheDir,

    #[error("legacy executable not found at '{0}'")]
    CustomPathMissing(PathBuf),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Where the legacy executable comes from.
#[derive(Debug, Clone)]
pub enum LegacySource {
    /// The payload compiled into the wrapper, deployed through the cache.
    Embedded(Payload),
    /// A local executable supplied by the user.
    Local(PathBuf),
}

/// Runs the legacy tool in capture mode.
///
/// The catalog fetcher depends on this seam rather than on [`LegacyCli`], so
/// it can be tested without a real executable.
#[async_trait]
pub trait CaptureRunner: Send + Sync {
    /// Run with `args`, returning captured stdout.
    async fn capture(
        &self,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, BridgeError>;
}

/// A legacy executable ready to run.
#[derive(Debug, Clone)]
pub struct LegacyCli {
    program: PathBuf,
    env: Vec<(OsString, OsString)>,
    bridge: Bridge,
}

impl LegacyCli {
    /// Resolve the executable, deploying the embedded payload if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if a local path does not exist, no cache directory
    /// can be determined, or the payload cannot be deployed.
    pub fn prepare(
        config: &Config,
        source: LegacySource,
        fs: Arc<dyn FileSystem>,
        verbosity: Verbosity,
    ) -> Result<Self, LegacyError> {
        let program = match source {
            LegacySource::Local(path) => {
                if fs.metadata(&path).is_err() {
                    return Err(LegacyError::CustomPathMissing(path));
                }
                output::debug(
                    format!("Using local legacy executable {}", path.display()),
                    verbosity,
                );
                path
            }
            LegacySource::Embedded(payload) => {
                let paths = CachePaths::from_config(config).ok_or(LegacyError::NoCacheDir)?;
                let cache = DeploymentCache::new(fs, paths);
                let deployed = cache.ensure_payload(&payload)?;
                match deployed.outcome {
                    SyncOutcome::Current => output::debug(
                        format!("Legacy payload is current at {}", deployed.file.path.display()),
                        verbosity,
                    ),
                    SyncOutcome::Written => output::debug(
                        format!("Deployed legacy payload to {}", deployed.file.path.display()),
                        verbosity,
                    ),
                }
                deployed.file.path
            }
        };

        Ok(Self::with_program(config, program))
    }

    /// Wrap an already available executable.
    pub fn with_program(config: &Config, program: PathBuf) -> Self {
        let env = vec![
            (config.env_var("WRAPPED").into(), "1".into()),
            (
                config.env_var("APPLICATION_EXECUTABLE").into(),
                config.application.executable.clone().into(),
            ),
            (
                config.env_var("WRAPPER_VERSION").into(),
                env!("CARGO_PKG_VERSION").into(),
            ),
        ];
        Self {
            program,
            env,
            bridge: Bridge,
        }
    }

    /// Path of the executable that will run.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Build an invocation for `args` with the wrapper environment.
    pub fn invocation<I, S>(&self, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut invocation = Invocation::new(self.program.clone()).args(args);
        invocation.env.extend(self.env.iter().cloned());
        invocation
    }

    /// Run with pass-through stdio.
    pub async fn exec<I, S>(&self, args: I, cancel: &CancellationToken) -> Result<(), BridgeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.bridge.run(&self.invocation(args), cancel).await
    }
}

#[async_trait]
impl CaptureRunner for LegacyCli {
    async fn capture(
        &self,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, BridgeError> {
        self.bridge
            .capture(&self.invocation(args.iter().cloned()), cancel)
            .await
    }
}
