//! `RepoHostPort` implementation for `GitHubClient`.
//!
//! Converts internal GitHub types and errors into core DTOs.

use async_trait::async_trait;
use portfolio_core::ports::{HostPortError, HostPortResult, RemoteRepository, RepoHostPort};

use crate::client::GitHubClient;
use crate::error::GitHubError;
use crate::http::HttpBackend;
use crate::models::RepoRef;

// ============================================================================
// Error Mapping
// ============================================================================

/// Convert an internal `GitHubError` to a core `HostPortError`.
///
/// A 404 on any repository endpoint means the repository is gone (or was
/// never visible to the token).
fn map_error(err: GitHubError, repo: &RepoRef) -> HostPortError {
    match err {
        GitHubError::ApiRequestFailed { status, url } => match status {
            404 => HostPortError::NotFound {
                owner: repo.owner.clone(),
                name: repo.name.clone(),
            },
            401 | 403 => HostPortError::AuthFailed { status },
            429 => HostPortError::RateLimited,
            _ => HostPortError::Network {
                message: format!("API request failed with status {status}: {url}"),
            },
        },
        GitHubError::InvalidResponse { message } => HostPortError::InvalidResponse { message },
        GitHubError::JsonParse(e) => HostPortError::InvalidResponse {
            message: e.to_string(),
        },
        GitHubError::Network(e) if e.is_decode() => HostPortError::InvalidResponse {
            message: e.to_string(),
        },
        GitHubError::Network(e) => HostPortError::Network {
            message: e.to_string(),
        },
        other @ (GitHubError::InvalidBaseUrl { .. } | GitHubError::InvalidHeader { .. }) => {
            HostPortError::Configuration {
                message: other.to_string(),
            }
        }
        GitHubError::InvalidUrl(e) => HostPortError::Configuration {
            message: e.to_string(),
        },
    }
}

// ============================================================================
// Port Implementation
// ============================================================================

#[async_trait]
impl<B: HttpBackend + Send + Sync> RepoHostPort for GitHubClient<B> {
    async fn get_repository(&self, owner: &str, name: &str) -> HostPortResult<RemoteRepository> {
        let repo = RepoRef::new(owner, name);
        let gh = self
            .fetch_repository(&repo)
            .await
            .map_err(|e| map_error(e, &repo))?;

        Ok(RemoteRepository {
            last_modified: gh.updated_at,
            html_url: gh.html_url,
        })
    }

    async fn get_languages(&self, owner: &str, name: &str) -> HostPortResult<Vec<String>> {
        let repo = RepoRef::new(owner, name);
        self.fetch_languages(&repo)
            .await
            .map_err(|e| map_error(e, &repo))
    }

    async fn get_readme_html(&self, owner: &str, name: &str) -> HostPortResult<String> {
        let repo = RepoRef::new(owner, name);
        self.fetch_readme_html(&repo)
            .await
            .map_err(|e| map_error(e, &repo))
    }
}
