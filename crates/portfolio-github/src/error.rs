//! Error types for GitHub operations.
//!
//! Internal to this crate except for construction failures; everything
//! else is mapped to `HostPortError` at the port boundary.

use thiserror::Error;

/// Result type alias for GitHub operations.
pub type GitHubResult<T> = Result<T, GitHubError>;

/// Errors from the GitHub client.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// API request failed with an HTTP error status.
    #[error("GitHub API request failed with status {status}: {url}")]
    ApiRequestFailed {
        /// HTTP status code
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// API returned an unexpected body.
    #[error("Invalid response from GitHub API: {message}")]
    InvalidResponse {
        /// Description of what was invalid
        message: String,
    },

    /// The configured API root cannot carry a path.
    #[error("Base URL '{url}' cannot be used as an API root")]
    InvalidBaseUrl {
        /// The rejected URL
        url: String,
    },

    /// A header value (token or user agent) is not valid HTTP.
    #[error("Invalid header value for {header}")]
    InvalidHeader {
        /// Header name
        header: &'static str,
    },

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}
