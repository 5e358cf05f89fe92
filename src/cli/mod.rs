//! cli
//!
//! Command-line interface layer.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration and build the execution [`Context`]
//! - Own the tokio runtime, the Ctrl-C cancellation token and the background
//!   update check
//! - Map errors to exit codes
//!
//! # Exit codes
//!
//! When the legacy executable ran and failed, its exit code is returned as-is
//! and nothing is printed: the legacy tool has already explained itself.
//! Every other failure prints one `error:` line (the full cause chain with
//! `--debug`) and exits with 1. A run interrupted by Ctrl-C exits with 130.

pub mod args;
pub mod commands;

pub use args::{Cli, Command};

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use tokio::runtime::{Handle, Runtime};
use tokio_util::sync::CancellationToken;

use crate::cache::OsFileSystem;
use crate::core::config::Config;
use crate::legacy::{BridgeError, LegacyCli, LegacySource, Payload};
use crate::ui::output::{self, Verbosity};
use crate::ui::shell_hints;
use crate::update::{self, GithubReleases, UpdateCheck};

/// Exit code for a run interrupted by Ctrl-C.
const EXIT_INTERRUPTED: u8 = 130;

/// Execution context shared by command handlers.
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    pub verbosity: Verbosity,
    /// Local legacy executable from `--legacy-path`.
    pub legacy_path: Option<PathBuf>,
    /// Runtime for async work; handlers call `block_on` on it.
    pub runtime: Handle,
    /// Tripped on Ctrl-C.
    pub cancel: CancellationToken,
}

impl Context {
    pub fn debug(&self) -> bool {
        self.verbosity.is_debug()
    }

    /// Resolve the legacy executable, deploying the bundled payload if needed.
    pub fn legacy(&self) -> Result<LegacyCli> {
        let source = match &self.legacy_path {
            Some(path) => LegacySource::Local(path.clone()),
            None => LegacySource::Embedded(Payload::embedded()),
        };
        LegacyCli::prepare(&self.config, source, Arc::new(OsFileSystem), self.verbosity)
            .context("Failed to prepare the legacy CLI")
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> ExitCode {
    let cli = Cli::parse_args();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);

    match execute(cli, verbosity) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => exit_code_for(&err, verbosity),
    }
}

fn execute(cli: Cli, verbosity: Verbosity) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let runtime = Runtime::new().context("Failed to start the async runtime")?;

    let cancel = CancellationToken::new();
    let trip = cancel.clone();
    runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trip.cancel();
        }
    });

    let mut update_check = start_update_check(runtime.handle(), &config, verbosity);

    let ctx = Context {
        config,
        verbosity,
        legacy_path: cli.legacy_path,
        runtime: runtime.handle().clone(),
        cancel,
    };

    let command = if cli.version {
        Some(Command::Version)
    } else {
        cli.command
    };
    let result = commands::dispatch(command, &ctx);

    shell_hints::warn_leftovers(&ctx.config.application.name, verbosity);
    if let Some(check) = update_check.as_mut() {
        report_update(check, &ctx);
    }
    drop(update_check);
    // Don't wait for the signal listener.
    runtime.shutdown_background();

    result
}

fn start_update_check(
    runtime: &Handle,
    config: &Config,
    verbosity: Verbosity,
) -> Option<UpdateCheck> {
    if !config.update_check_enabled() {
        return None;
    }
    match GithubReleases::new(config.wrapper.github_repo.clone()) {
        Ok(source) => Some(update::spawn_update_check(
            runtime,
            Arc::new(source),
            env!("CARGO_PKG_VERSION"),
        )),
        Err(err) => {
            output::debug(format!("Update check disabled: {}", err), verbosity);
            None
        }
    }
}

fn report_update(check: &mut UpdateCheck, ctx: &Context) {
    match check.poll() {
        Some(Ok(Some(release))) => output::notice(
            format!(
                "\n{}\n",
                update::notice(
                    &ctx.config.application.name,
                    env!("CARGO_PKG_VERSION"),
                    &release
                )
            ),
            ctx.verbosity,
        ),
        Some(Ok(None)) => output::debug("No newer release available", ctx.verbosity),
        Some(Err(err)) => output::debug(format!("Update check failed: {}", err), ctx.verbosity),
        None => output::debug("Update check did not finish in time", ctx.verbosity),
    }
}

/// The legacy exit code carried anywhere in the error chain.
pub fn legacy_exit_code(err: &anyhow::Error) -> Option<i32> {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<BridgeError>())
        .find_map(BridgeError::exit_code)
}

fn is_cancelled(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<BridgeError>())
        .any(|e| matches!(e, BridgeError::Cancelled))
}

fn exit_code_for(err: &anyhow::Error, verbosity: Verbosity) -> ExitCode {
    if let Some(code) = legacy_exit_code(err) {
        output::debug(format!("{:#}", err), verbosity);
        return ExitCode::from(u8::try_from(code).unwrap_or(1));
    }
    if is_cancelled(err) {
        output::debug("Interrupted", verbosity);
        return ExitCode::from(EXIT_INTERRUPTED);
    }

    if verbosity.is_debug() {
        output::error(format!("{:#}", err));
    } else {
        output::error(err);
    }
    ExitCode::FAILURE
}
