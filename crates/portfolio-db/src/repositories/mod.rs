//! Repository implementations using `SQLite`.
//!
//! These implementations encapsulate all SQL queries and database access.
//! The `SqlitePool` is confined to this module and never exposed through
//! the port trait signatures.

mod row_mappers;
mod sqlite_error_log_repository;
mod sqlite_project_repository;

pub use sqlite_error_log_repository::SqliteErrorLogRepository;
pub use sqlite_project_repository::SqliteProjectRepository;
