//! Row mapping helpers for `SQLite` queries.

use chrono::{DateTime, NaiveDateTime, Utc};
use portfolio_core::{ErrorRecord, Project, RepositoryError};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

/// Columns returned by the active-project listing.
pub const LISTED_PROJECT_COLUMNS: &str = "id, name, logo_url, project_url, updated_at";

/// Columns of an error-log row.
pub const ERROR_LOG_COLUMNS: &str =
    "message, error_type, source_url, trace, username, logged_at";

/// Timestamp in the stored form.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

/// Parse a stored timestamp.
///
/// RFC 3339 is what this crate writes; the `YYYY-MM-DD HH:MM:SS` form that
/// `SQLite`'s own `datetime()` produces is accepted for hand-seeded rows.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    let trimmed = raw.trim_end_matches(" UTC");
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f")
        .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
        .ok()
}

fn column<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name)
        .map_err(|e| RepositoryError::Storage(e.to_string()))
}

/// Parse a listing row into a Project with synced fields unset.
pub fn row_to_listed_project(row: &SqliteRow) -> Result<Project, RepositoryError> {
    let updated_at = match column::<Option<String>>(row, "updated_at")? {
        Some(raw) => Some(parse_timestamp(&raw).ok_or_else(|| {
            RepositoryError::Storage(format!("Unreadable updated_at value '{raw}'"))
        })?),
        None => None,
    };

    Ok(Project::listed(
        column::<i64>(row, "id")?,
        column::<String>(row, "name")?,
        column::<String>(row, "logo_url")?,
        column(row, "project_url")?,
        updated_at,
    ))
}

/// Parse a full project row, synced fields included.
pub fn row_to_project(row: &SqliteRow) -> Result<Project, RepositoryError> {
    let mut project = row_to_listed_project(row)?;
    project.content = column(row, "content")?;
    project.languages = column::<Option<String>>(row, "languages")?
        .as_deref()
        .map(Project::parse_languages)
        .unwrap_or_default();
    project.logo_alt_text = column(row, "logo_alt_text")?;
    project.github_url = column(row, "github_url")?;
    Ok(project)
}

/// Parse an error-log row.
pub fn row_to_error_record(row: &SqliteRow) -> Result<ErrorRecord, RepositoryError> {
    let logged_at_raw: String = column(row, "logged_at")?;
    let logged_at = parse_timestamp(&logged_at_raw).ok_or_else(|| {
        RepositoryError::Storage(format!("Unreadable logged_at value '{logged_at_raw}'"))
    })?;

    Ok(ErrorRecord {
        message: column(row, "message")?,
        error_type: column(row, "error_type")?,
        source_url: column(row, "source_url")?,
        trace: column(row, "trace")?,
        username: column(row, "username")?,
        logged_at,
    })
}

/// Map a `sqlx` error, turning unique violations into `AlreadyExists`.
pub fn map_sqlx_error(e: &sqlx::Error, what: &str) -> RepositoryError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => RepositoryError::AlreadyExists(what.to_string()),
        Some(db) if db.is_check_violation() || db.is_foreign_key_violation() => {
            RepositoryError::Constraint(db.message().to_string())
        }
        _ => RepositoryError::Storage(e.to_string()),
    }
}
