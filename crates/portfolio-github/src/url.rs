//! URL construction for GitHub API endpoints.

use crate::models::{GitHubConfig, RepoRef};
use url::Url;

/// `{base}/repos/{owner}/{name}` followed by `tail` segments.
///
/// Segments are percent-encoded, so names can never escape the repo path.
fn repo_endpoint(config: &GitHubConfig, repo: &RepoRef, tail: &[&str]) -> Url {
    let mut url = config.base_url.clone();
    // `GitHubConfig` guarantees the base can carry a path.
    if let Ok(mut segments) = url.path_segments_mut() {
        segments
            .pop_if_empty()
            .extend(["repos", repo.owner.as_str(), repo.name.as_str()])
            .extend(tail);
    }
    url
}

/// Repository metadata.
pub fn build_repo_url(config: &GitHubConfig, repo: &RepoRef) -> Url {
    repo_endpoint(config, repo, &[])
}

/// Language breakdown.
pub fn build_languages_url(config: &GitHubConfig, repo: &RepoRef) -> Url {
    repo_endpoint(config, repo, &["languages"])
}

/// Default-branch readme.
pub fn build_readme_url(config: &GitHubConfig, repo: &RepoRef) -> Url {
    repo_endpoint(config, repo, &["readme"])
}
