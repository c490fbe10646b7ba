//! Public configuration for the GitHub client.
//!
//! The internal config is derived from this and validated once, when the
//! client is built.

use std::fmt;
use std::time::Duration;

/// Default API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Configuration for the GitHub client.
///
/// # Example
///
/// ```
/// use portfolio_github::GitHubClientConfig;
/// use std::time::Duration;
///
/// let config = GitHubClientConfig::new()
///     .with_token("ghp_example")
///     .with_timeout(Duration::from_secs(10));
/// ```
#[derive(Clone)]
pub struct GitHubClientConfig {
    /// API root, without the `/repos` segment
    pub(crate) base_url: String,
    /// User agent sent with every request (GitHub rejects requests without one)
    pub(crate) user_agent: String,
    /// Request timeout
    pub(crate) timeout: Duration,
    /// Bearer token
    pub(crate) token: Option<String>,
}

impl Default for GitHubClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            user_agent: concat!("PortfolioUpdater/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
            token: None,
        }
    }
}

// Keep the token out of debug output.
impl fmt::Debug for GitHubClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClientConfig")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl GitHubClientConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API root.
    ///
    /// Defaults to `https://api.github.com`.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the access token sent as `Authorization: Bearer <token>`.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set an optional access token.
    #[must_use]
    pub fn with_optional_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }
}
