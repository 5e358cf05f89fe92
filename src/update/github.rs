//! update::github
//!
//! Reads the latest release of a GitHub repository.
//!
//! Uses the unauthenticated REST endpoint
//! `GET /repos/{owner}/{repo}/releases/latest`. The request has a short
//! timeout; the check runs in the background and its result is discarded if
//! it arrives late anyway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use serde::Deserialize;

use super::{ReleaseInfo, ReleaseSource, UpdateError};

/// Default GitHub API base URL.
const DEFAULT_API_BASE: &str = "https://api.github.com";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = concat!("legacy-bridge/", env!("CARGO_PKG_VERSION"));

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct GitHubRelease {
    tag_name: String,
    html_url: String,
}

/// Releases of one GitHub repository.
#[derive(Debug, Clone)]
pub struct GithubReleases {
    client: Client,
    /// `owner/repo`
    repo: String,
    /// API base URL (configurable for tests and GitHub Enterprise)
    api_base: String,
}

impl GithubReleases {
    /// Create a client for `repo` (`owner/repo`) on github.com.
    pub fn new(repo: impl Into<String>) -> Result<Self, UpdateError> {
        Self::with_api_base(repo, DEFAULT_API_BASE)
    }

    /// Create a client against a custom API base URL.
    pub fn with_api_base(
        repo: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Result<Self, UpdateError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers())
            .build()?;
        Ok(Self {
            client,
            repo: repo.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    fn latest_url(&self) -> String {
        format!("{}/repos/{}/releases/latest", self.api_base, self.repo)
    }
}

fn headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
    headers.insert(
        "X-GitHub-Api-Version",
        HeaderValue::from_static("2022-11-28"),
    );
    headers
}

#[async_trait]
impl ReleaseSource for GithubReleases {
    async fn latest_release(&self) -> Result<ReleaseInfo, UpdateError> {
        let response = self.client.get(self.latest_url()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::Status {
                status: status.as_u16(),
            });
        }

        let release: GitHubRelease = response.json().await?;
        Ok(ReleaseInfo {
            version: release.tag_name.trim_start_matches('v').to_string(),
            url: release.html_url,
        })
    }
}
