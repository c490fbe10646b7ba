//! Internal API types for the GitHub REST API.
//!
//! Not exposed to consumers; `portfolio-core` DTOs cross the port boundary.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use url::Url;

use crate::config::GitHubClientConfig;
use crate::error::{GitHubError, GitHubResult};

// ============================================================================
// Configuration (used internally, see config.rs for public config)
// ============================================================================

/// Validated client configuration.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// API root; always able to carry path segments
    pub base_url: Url,
    pub token: Option<String>,
    pub user_agent: String,
    pub timeout: Duration,
}

impl GitHubConfig {
    pub fn from_public(config: &GitHubClientConfig) -> GitHubResult<Self> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(GitHubError::InvalidBaseUrl {
                url: config.base_url.clone(),
            });
        }

        Ok(Self {
            base_url,
            token: config.token.clone(),
            user_agent: config.user_agent.clone(),
            timeout: config.timeout,
        })
    }
}

#[cfg(test)]
impl Default for GitHubConfig {
    fn default() -> Self {
        Self::from_public(&GitHubClientConfig::default()).unwrap()
    }
}

// ============================================================================
// Repository Reference
// ============================================================================

/// An `owner/name` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

// ============================================================================
// API Responses
// ============================================================================

/// The subset of `GET /repos/{owner}/{name}` the service reads.
#[derive(Debug, Clone, Deserialize)]
pub struct GhRepository {
    pub html_url: String,
    /// Last change to the repository object (pushes, settings, description).
    pub updated_at: DateTime<Utc>,
}

/// `GET /repos/{owner}/{name}/languages`: language name to byte count.
pub type GhLanguages = HashMap<String, u64>;

/// Language names ordered by byte count, largest first, ties by name.
pub fn rank_languages(languages: GhLanguages) -> Vec<String> {
    let mut ranked: Vec<(String, u64)> = languages.into_iter().collect();
    ranked.sort_by(|(a_name, a_bytes), (b_name, b_bytes)| {
        b_bytes.cmp(a_bytes).then_with(|| a_name.cmp(b_name))
    });
    ranked.into_iter().map(|(name, _)| name).collect()
}
