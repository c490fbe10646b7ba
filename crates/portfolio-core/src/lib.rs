//! Core domain, ports and the update cycle for portfolio-updater.
//!
//! Infrastructure lives elsewhere: `portfolio-db` implements the repository
//! ports on SQLite, `portfolio-github` implements [`RepoHostPort`], and
//! `portfolio-runtime` drives [`UpdateCycle`] on a timer.

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod ports;
pub mod services;
pub mod settings;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use domain::{
    ErrorRecord, LANGUAGE_SEPARATOR, NewProject, Project, ProjectRefresh, SERVICE_TAG,
    TRACE_UNAVAILABLE,
};
pub use ports::{
    Clock, CycleError, ErrorLogRepository, HostPortError, HostPortResult, ProjectRepository,
    RemoteRepository, RepoHostPort, Repos, RepositoryError, SystemClock,
};
pub use services::{CycleReport, ProjectFailure, ProjectOutcome, UpdateCycle, needs_refresh};
pub use settings::{
    DEFAULT_SYNC_INTERVAL, FailurePolicy, MIN_SYNC_INTERVAL, SettingsError, StalenessRule,
    SyncSettings, validate_settings,
};

#[cfg(test)]
use tokio_test as _;
