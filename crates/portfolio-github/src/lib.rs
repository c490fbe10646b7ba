//! GitHub REST client for portfolio-updater.
//!
//! Implements `portfolio_core::RepoHostPort` against the GitHub v3 API:
//! repository metadata, language breakdown and the rendered readme.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]
// DefaultGitHubClient is used through RepoHostPort, not its generic internals
#![allow(private_interfaces)]

mod client;
mod config;
mod error;
mod http;
mod models;
mod port;
mod url;

// ============================================================================
// Public API
// ============================================================================

pub use client::DefaultGitHubClient;
pub use config::{DEFAULT_API_URL, GitHubClientConfig};
pub use error::GitHubError;

#[cfg(test)]
use tokio_test as _;
