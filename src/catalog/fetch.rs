//! catalog::fetch
//!
//! Introspects the legacy executable for its command list.

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::model::Catalog;
use crate::legacy::{BridgeError, CaptureRunner};

/// Errors from fetching the legacy catalog.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The legacy process could not be run or exited unsuccessfully.
    #[error("failed to list legacy commands")]
    Bridge(#[source] BridgeError),

    /// The legacy process succeeded but printed something that is not a catalog.
    #[error("legacy command list is not valid JSON")]
    Parse(#[source] serde_json::Error),
}

/// What to ask the legacy executable for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    pub namespace: Option<String>,
    pub all: bool,
}

impl ListRequest {
    /// Arguments for the legacy `list` command in JSON mode.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["list".to_string(), "--format=json".to_string()];
        if self.all {
            args.push("--all".to_string());
        }
        if let Some(namespace) = &self.namespace {
            args.push(namespace.clone());
        }
        args
    }
}

/// Run the legacy list command and parse its output.
pub async fn fetch(
    runner: &dyn CaptureRunner,
    request: &ListRequest,
    cancel: &CancellationToken,
) -> Result<Catalog, FetchError> {
    let stdout = runner
        .capture(&request.args(), cancel)
        .await
        .map_err(FetchError::Bridge)?;
    parse(&stdout)
}

/// Parse a legacy JSON catalog document.
pub fn parse(bytes: &[u8]) -> Result<Catalog, FetchError> {
    serde_json::from_slice(bytes).map_err(FetchError::Parse)
}
