//! Sync settings and validation.
//!
//! These are pure domain types with no infrastructure dependencies. The CLI
//! fills them from flags, environment and `.env`, then validates them once at
//! startup; an invalid value is fatal there, never a per-cycle error.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default time between update cycles.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Shortest interval accepted by validation.
pub const MIN_SYNC_INTERVAL: Duration = Duration::from_secs(10);

/// How a cycle reacts when one project fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// End the whole cycle at the first failure.
    #[default]
    Abort,
    /// Record the failure and continue with the next project.
    Skip,
}

/// Comparison used by the staleness check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StalenessRule {
    /// Refresh when `remote >= local`. An unchanged repository modified at
    /// exactly the last write time is fetched again.
    #[default]
    Inclusive,
    /// Refresh only when `remote > local`.
    Strict,
}

impl FromStr for FailurePolicy {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" | "abort-cycle" => Ok(Self::Abort),
            "skip" | "skip-project" => Ok(Self::Skip),
            other => Err(SettingsError::InvalidFailurePolicy(other.to_string())),
        }
    }
}

impl FromStr for StalenessRule {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inclusive" | ">=" => Ok(Self::Inclusive),
            "strict" | ">" => Ok(Self::Strict),
            other => Err(SettingsError::InvalidStalenessRule(other.to_string())),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abort => write!(f, "abort"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

impl fmt::Display for StalenessRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inclusive => write!(f, "inclusive"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

/// Settings for the update cycle and its scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Account that owns every tracked repository on the host.
    pub owner: String,
    /// Time between scheduled cycles.
    pub interval: Duration,
    /// Reaction to a failing project.
    pub failure_policy: FailurePolicy,
    /// Staleness comparison.
    pub staleness_rule: StalenessRule,
}

impl SyncSettings {
    /// Settings for `owner` with default interval and policies.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            interval: DEFAULT_SYNC_INTERVAL,
            failure_policy: FailurePolicy::default(),
            staleness_rule: StalenessRule::default(),
        }
    }

    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub const fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    #[must_use]
    pub const fn with_staleness_rule(mut self, rule: StalenessRule) -> Self {
        self.staleness_rule = rule;
        self
    }
}

/// Settings validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Repository owner cannot be empty")]
    EmptyOwner,

    #[error("Sync interval must be at least {min}s, got {got}s")]
    IntervalTooShort { min: u64, got: u64 },

    #[error("Unknown failure policy '{0}' (expected 'abort' or 'skip')")]
    InvalidFailurePolicy(String),

    #[error("Unknown staleness rule '{0}' (expected 'inclusive' or 'strict')")]
    InvalidStalenessRule(String),
}

/// Validate settings values.
pub fn validate_settings(settings: &SyncSettings) -> Result<(), SettingsError> {
    if settings.owner.trim().is_empty() {
        return Err(SettingsError::EmptyOwner);
    }

    if settings.interval < MIN_SYNC_INTERVAL {
        return Err(SettingsError::IntervalTooShort {
            min: MIN_SYNC_INTERVAL.as_secs(),
            got: settings.interval.as_secs(),
        });
    }

    Ok(())
}
