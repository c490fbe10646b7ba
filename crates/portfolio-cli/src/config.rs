//! Process configuration.
//!
//! Resolves the parsed [`Cli`] (flags already merged with the environment by
//! clap) into validated settings. Any missing or invalid value is a
//! [`CliError`] that aborts startup.

use std::fmt;
use std::time::Duration;

use portfolio_core::{FailurePolicy, StalenessRule, SyncSettings, validate_settings};
use portfolio_github::GitHubClientConfig;

use crate::error::CliError;
use crate::parser::Cli;

/// Fully resolved configuration for commands that talk to GitHub.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub github_token: String,
    pub api_url: Option<String>,
    pub sync: SyncSettings,
}

impl AppConfig {
    /// Resolve and validate every setting.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let database_url = resolve_database_url(cli)?;
        let github_token = required(cli.github_token.as_deref(), "GITHUB_TOKEN")?;
        let owner = required(cli.github_username.as_deref(), "GITHUB_USERNAME")?;

        let mut sync = SyncSettings::new(owner);
        if let Some(raw) = present(cli.interval_secs.as_deref()) {
            let secs: u64 = raw.parse().map_err(|_| {
                CliError::Config(format!(
                    "SYNC_INTERVAL_SECS must be a whole number, got '{raw}'"
                ))
            })?;
            sync = sync.with_interval(Duration::from_secs(secs));
        }
        if let Some(raw) = present(cli.failure_policy.as_deref()) {
            sync = sync.with_failure_policy(raw.parse::<FailurePolicy>()?);
        }
        if let Some(raw) = present(cli.staleness_rule.as_deref()) {
            sync = sync.with_staleness_rule(raw.parse::<StalenessRule>()?);
        }
        validate_settings(&sync)?;

        Ok(Self {
            database_url,
            github_token,
            api_url: present(cli.api_url.as_deref()).map(str::to_string),
            sync,
        })
    }

    /// GitHub client configuration carrying the token.
    pub fn github_client_config(&self) -> GitHubClientConfig {
        let config = GitHubClientConfig::new().with_token(self.github_token.clone());
        match &self.api_url {
            Some(url) => config.with_base_url(url.clone()),
            None => config,
        }
    }
}

// Keep the token out of debug output.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &self.database_url)
            .field("github_token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("sync", &self.sync)
            .finish()
    }
}

impl fmt::Display for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DATABASE_URL:       {}", self.database_url)?;
        writeln!(f, "GITHUB_TOKEN:       {}", redact(&self.github_token))?;
        writeln!(f, "GITHUB_USERNAME:    {}", self.sync.owner)?;
        writeln!(
            f,
            "GITHUB_API_URL:     {}",
            self.api_url
                .as_deref()
                .unwrap_or(portfolio_github::DEFAULT_API_URL)
        )?;
        writeln!(f, "SYNC_INTERVAL_SECS: {}", self.sync.interval.as_secs())?;
        writeln!(f, "FAILURE_POLICY:     {}", self.sync.failure_policy)?;
        write!(f, "STALENESS_RULE:     {}", self.sync.staleness_rule)
    }
}

/// Resolve only the store location, for commands that never reach GitHub.
pub fn resolve_database_url(cli: &Cli) -> Result<String, CliError> {
    required(cli.database_url.as_deref(), "DATABASE_URL")
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn required(value: Option<&str>, name: &'static str) -> Result<String, CliError> {
    present(value)
        .map(str::to_string)
        .ok_or(CliError::MissingSetting(name))
}

/// Show at most the last four characters of a secret.
fn redact(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}
