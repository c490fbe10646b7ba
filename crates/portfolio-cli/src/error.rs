//! CLI-specific error types and exit codes.

use portfolio_core::{RepositoryError, SettingsError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// A required setting is missing or empty.
    #[error("Configuration error: {0} is not set")]
    MissingSetting(&'static str),

    /// A setting has an unusable value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store error.
    #[error("Database error: {0}")]
    Database(String),

    /// An update cycle failed.
    #[error("Update cycle failed: {0}")]
    Cycle(String),
}

impl CliError {
    /// Map error to a process exit code (sysexits.h where one fits).
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::MissingSetting(_) | Self::Config(_) => 78, // EX_CONFIG
            Self::Database(_) => 73,                         // EX_CANTCREAT
            Self::Cycle(_) => 1,
        }
    }
}

/// Exit code for any error that reaches `main`.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<CliError>().map_or(1, CliError::exit_code)
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<RepositoryError> for CliError {
    fn from(err: RepositoryError) -> Self {
        Self::Database(err.to_string())
    }
}
