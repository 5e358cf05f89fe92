//! update
//!
//! Background check for newer releases.
//!
//! # Design
//!
//! The check runs as a spawned task that delivers a single result into a
//! one-slot channel. The command being run never waits for it: at shutdown
//! the CLI polls the channel once and drops the [`UpdateCheck`], which aborts
//! the task if it has not finished. A check can therefore never delay the
//! process or change its exit code.
//!
//! # Modules
//!
//! - [`github`] - GitHub releases API client

pub mod github;

pub use github::GithubReleases;

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Errors from checking for releases.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("release request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("release API returned status {status}")]
    Status { status: u16 },

    #[error("release has no usable version: '{0}'")]
    InvalidVersion(String),
}

/// The latest published release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    pub version: String,
    pub url: String,
}

/// Somewhere releases are published.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetch the most recent release.
    async fn latest_release(&self) -> Result<ReleaseInfo, UpdateError>;
}

/// Result delivered by a finished check: `Some` when a newer release exists.
pub type UpdateResult = Result<Option<ReleaseInfo>, UpdateError>;

/// Ask `source` whether a release newer than `current` exists.
pub async fn check(source: &dyn ReleaseSource, current: &str) -> UpdateResult {
    let latest = source.latest_release().await?;
    if parse_version(&latest.version).is_none() {
        return Err(UpdateError::InvalidVersion(latest.version));
    }
    Ok(is_newer(&latest.version, current).then_some(latest))
}

/// Handle to a running background check.
#[derive(Debug)]
pub struct UpdateCheck {
    rx: mpsc::Receiver<UpdateResult>,
    task: JoinHandle<()>,
}

impl UpdateCheck {
    /// Take the result if the check has finished, without waiting.
    pub fn poll(&mut self) -> Option<UpdateResult> {
        self.rx.try_recv().ok()
    }
}

impl Drop for UpdateCheck {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start a check on `runtime`.
pub fn spawn_update_check(
    runtime: &Handle,
    source: Arc<dyn ReleaseSource>,
    current_version: impl Into<String>,
) -> UpdateCheck {
    let (tx, rx) = mpsc::channel(1);
    let current = current_version.into();
    let task = runtime.spawn(async move {
        let result = check(source.as_ref(), &current).await;
        // The receiver is gone if the command already finished.
        let _ = tx.try_send(result);
    });
    UpdateCheck { rx, task }
}

/// The text shown when a newer release exists.
pub fn notice(app_name: &str, current: &str, release: &ReleaseInfo) -> String {
    format!(
        "A new release of {} is available: {} → {}\n{}",
        app_name, current, release.version, release.url
    )
}

/// Parse the numeric part of a version such as `v4.10.0-beta.1`.
fn parse_version(version: &str) -> Option<Vec<u64>> {
    let version = version.trim().trim_start_matches('v');
    let base = version.split(['-', '+']).next()?;
    base.split('.').map(|part| part.parse().ok()).collect()
}

/// Whether `candidate` is a strictly newer dotted version than `current`.
///
/// Missing components count as zero, so `1.2` equals `1.2.0`. Unparseable
/// versions are never newer.
pub fn is_newer(candidate: &str, current: &str) -> bool {
    let (Some(candidate), Some(current)) = (parse_version(candidate), parse_version(current))
    else {
        return false;
    };

    let len = candidate.len().max(current.len());
    for i in 0..len {
        let a = candidate.get(i).copied().unwrap_or(0);
        let b = current.get(i).copied().unwrap_or(0);
        match a.cmp(&b) {
            Ordering::Greater => return true,
            Ordering::Less => return false,
            Ordering::Equal => {}
        }
    }
    false
}
