//! GitHub client for repository metadata, languages and readmes.

mod repos;

use crate::config::GitHubClientConfig;
use crate::error::GitHubResult;
use crate::http::{HttpBackend, ReqwestBackend};
use crate::models::GitHubConfig;

// ============================================================================
// Type Aliases
// ============================================================================

/// GitHub client using the reqwest HTTP backend.
pub type DefaultGitHubClient = GitHubClient<ReqwestBackend>;

// ============================================================================
// Client
// ============================================================================

/// Client for the GitHub REST API, generic over its HTTP backend.
///
/// Use `DefaultGitHubClient::new()` in production code.
pub struct GitHubClient<B: HttpBackend> {
    pub(crate) backend: B,
    pub(crate) config: GitHubConfig,
}

impl DefaultGitHubClient {
    /// Create a client from public configuration.
    ///
    /// Fails if the base URL cannot be used as an API root or the token or
    /// user agent are not valid header values.
    pub fn new(config: &GitHubClientConfig) -> GitHubResult<Self> {
        let internal_config = GitHubConfig::from_public(config)?;
        let backend = ReqwestBackend::new(&internal_config)?;
        Ok(Self {
            backend,
            config: internal_config,
        })
    }
}

impl<B: HttpBackend> GitHubClient<B> {
    /// Create a client with a custom backend.
    #[cfg(test)]
    pub(crate) const fn with_backend(config: GitHubConfig, backend: B) -> Self {
        Self { backend, config }
    }
}
