//! HTTP backend abstraction for the GitHub API.
//!
//! The client is generic over [`HttpBackend`] so tests can inject canned
//! responses. The production backend sends exactly one request per call:
//! no retries, no backoff.

use crate::error::{GitHubError, GitHubResult};
use crate::models::GitHubConfig;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use url::Url;

/// Media type for JSON API responses.
pub const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Media type asking GitHub to render markup to HTML.
pub const HTML_MEDIA_TYPE: &str = "application/vnd.github.html+json";

const API_VERSION: &str = "2022-11-28";

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Trait for HTTP backends that can fetch from GitHub URLs.
///
/// This is an implementation detail; external code uses `RepoHostPort`.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// GET `url` as JSON and deserialize the body.
    async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> GitHubResult<T>;

    /// GET `url` with the given `Accept` header and return the body as text.
    async fn get_text(&self, url: &Url, accept: &str) -> GitHubResult<String>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend using reqwest.
pub struct ReqwestBackend {
    client: reqwest::Client,
}

impl ReqwestBackend {
    /// Create a backend with auth and user agent baked into default headers.
    pub fn new(config: &GitHubConfig) -> GitHubResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|_| GitHubError::InvalidHeader { header: "User-Agent" })?,
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(API_VERSION),
        );
        if let Some(ref token) = config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| GitHubError::InvalidHeader { header: "Authorization" })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }

    /// Send one GET and fail on any non-success status.
    async fn fetch(&self, url: &Url, accept: &str) -> GitHubResult<reqwest::Response> {
        tracing::debug!(%url, accept, "GitHub request");
        let response = self
            .client
            .get(url.as_str())
            .header(ACCEPT, accept)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        Err(GitHubError::ApiRequestFailed {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> GitHubResult<T> {
        let response = self.fetch(url, JSON_MEDIA_TYPE).await?;
        // Decode ourselves so a bad body is a parse error, not a network one.
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get_text(&self, url: &Url, accept: &str) -> GitHubResult<String> {
        let response = self.fetch(url, accept).await?;
        Ok(response.text().await?)
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================
