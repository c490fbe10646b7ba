//! Error types for repository host port operations.

use thiserror::Error;

/// Errors from repository host port operations.
///
/// These are domain-level errors that consumers can handle.
/// Implementation-specific errors (HTTP, JSON) are mapped to these.
#[derive(Debug, Error)]
pub enum HostPortError {
    /// The repository does not exist (or is no longer visible) on the host.
    #[error("Repository not found: {owner}/{name}")]
    NotFound {
        /// Repository owner
        owner: String,
        /// Repository name
        name: String,
    },

    /// The configured credential was rejected.
    #[error("Authentication failed (status {status})")]
    AuthFailed {
        /// HTTP status returned by the host
        status: u16,
    },

    /// API rate limit exceeded.
    #[error("Rate limit exceeded, try again later")]
    RateLimited,

    /// Network or connectivity error.
    #[error("Network error: {message}")]
    Network {
        /// Description of the network error
        message: String,
    },

    /// Invalid response from the API.
    #[error("Invalid API response: {message}")]
    InvalidResponse {
        /// What was invalid
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Configuration {
        /// What's wrong with the configuration
        message: String,
    },
}

impl HostPortError {
    /// Whether this error means the repository itself is gone.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type alias for repository host port operations.
pub type HostPortResult<T> = Result<T, HostPortError>;
