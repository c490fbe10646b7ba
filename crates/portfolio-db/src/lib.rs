//! `SQLite` storage for portfolio-updater.
//!
//! Implements the `ProjectRepository` and `ErrorLogRepository` ports from
//! `portfolio-core` on top of a `sqlx` pool. Nothing outside this crate sees
//! `sqlx` types.

#![deny(unsafe_code)]

pub mod factory;
pub mod repositories;
pub mod setup;

pub use factory::CoreFactory;

#[cfg(any(test, feature = "test-utils"))]
pub use factory::TestDb;

pub use repositories::{SqliteErrorLogRepository, SqliteProjectRepository};

pub use setup::{setup_database, setup_database_file};
#[cfg(any(test, feature = "test-utils"))]
pub use setup::setup_test_database;
