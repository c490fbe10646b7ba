//! Domain types shared across the workspace.
//!
//! Pure data with no infrastructure dependencies.

mod error_log;
mod project;

pub use error_log::{ErrorRecord, SERVICE_TAG, TRACE_UNAVAILABLE};
pub use project::{LANGUAGE_SEPARATOR, NewProject, Project, ProjectRefresh};
