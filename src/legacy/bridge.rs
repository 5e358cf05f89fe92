//! legacy::bridge
//!
//! Runs the legacy executable as a child process.
//!
//! # Modes
//!
//! - **Pass-through** ([`Bridge::run`]): stdin, stdout and stderr are
//!   inherited, so interactive prompts and colored output behave as if the
//!   legacy tool had been started directly.
//! - **Capture** ([`Bridge::capture`]): stdout is collected in memory for
//!   machine-readable output; stdin and stderr stay inherited.
//!
//! One invocation uses exactly one mode.
//!
//! # Exit status
//!
//! A non-zero exit becomes [`BridgeError::Exited`] with the exact code. On Unix
//! a child killed by a signal reports `128 + signal`, as shells do. Failure to
//! start the child is a separate [`BridgeError::Spawn`].
//!
//! # Cancellation
//!
//! When the token is cancelled the child is killed and reaped, and the call
//! returns [`BridgeError::Cancelled`] without waiting for the child to finish on
//! its own.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Errors from running the legacy executable.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The executable could not be started.
    #[error("cannot run '{program}': {source}")]
    Spawn {
        program: PathBuf,
        source: io::Error,
    },

    /// The executable ran and exited unsuccessfully.
    #[error("legacy command exited with code {code}")]
    Exited { code: i32 },

    /// Waiting for the child or reading its output failed.
    #[error("lost track of the legacy process: {0}")]
    Io(#[from] io::Error),

    /// The run was cancelled and the child terminated.
    #[error("legacy command cancelled")]
    Cancelled,
}

impl BridgeError {
    /// Exit code to propagate, if the child ran to completion.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            BridgeError::Exited { code } => Some(*code),
            _ => None,
        }
    }
}

/// A fully specified execution of the legacy program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub env: Vec<(OsString, OsString)>,
}

impl Invocation {
    /// Create an invocation with no arguments or extra environment.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Append arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child.
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// Launches [`Invocation`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bridge;

impl Bridge {
    /// Run with inherited stdio.
    pub async fn run(
        &self,
        invocation: &Invocation,
        cancel: &CancellationToken,
    ) -> Result<(), BridgeError> {
        self.execute(invocation, false, cancel).await.map(|_| ())
    }

    /// Run with stdout captured, returning what the child printed.
    pub async fn capture(
        &self,
        invocation: &Invocation,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, BridgeError> {
        self.execute(invocation, true, cancel).await
    }

    async fn execute(
        &self,
        invocation: &Invocation,
        capture: bool,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, BridgeError> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::inherit())
            .stderr(Stdio::inherit())
            .stdout(if capture {
                Stdio::piped()
            } else {
                Stdio::inherit()
            })
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| BridgeError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;
        let stdout = child.stdout.take();

        let finished = tokio::select! {
            biased;

            _ = cancel.cancelled() => None,
            result = async {
                let read = async move {
                    let mut buffer = Vec::new();
                    if let Some(mut out) = stdout {
                        out.read_to_end(&mut buffer).await?;
                    }
                    Ok::<_, io::Error>(buffer)
                };
                tokio::try_join!(child.wait(), read)
            } => Some(result),
        };

        match finished {
            Some(result) => {
                let (status, buffer) = result?;
                check_status(status)?;
                Ok(buffer)
            }
            None => {
                // Best effort: the child may already be gone.
                let _ = child.start_kill();
                let _ = child.wait().await;
                Err(BridgeError::Cancelled)
            }
        }
    }
}

fn check_status(status: ExitStatus) -> Result<(), BridgeError> {
    if status.success() {
        return Ok(());
    }
    Err(BridgeError::Exited {
        code: exit_code(status),
    })
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
