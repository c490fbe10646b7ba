//! Repository host (GitHub) port definitions.
//!
//! This module defines the port trait and DTOs for hosting-API interaction.
//! The actual implementation lives in `portfolio-github`.

mod client;
mod error;
mod types;

pub use client::RepoHostPort;
pub use error::{HostPortError, HostPortResult};
pub use types::RemoteRepository;
