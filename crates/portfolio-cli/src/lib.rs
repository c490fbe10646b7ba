//! Command-line front end for portfolio-updater.
//!
//! `main.rs` parses arguments and dispatches; everything it needs lives here
//! so handlers can be tested without spawning the binary.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by the binary only.
use dotenvy as _;
use tracing_subscriber as _;

#[cfg(test)]
use tokio_test as _;

pub mod bootstrap;
pub mod commands;
pub mod config;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;

pub use bootstrap::{CliContext, StoreContext, bootstrap, bootstrap_with, open_store};
pub use commands::{Commands, ProjectsCommand};
pub use config::{AppConfig, resolve_database_url};
pub use error::{CliError, exit_code_for};
pub use parser::Cli;
