//! Main CLI parser and top-level argument handling.
//!
//! Every global option can also come from its environment variable; `.env` is
//! loaded into the environment before parsing, so flags win over the process
//! environment, which wins over `.env`.

use clap::Parser;

use crate::commands::Commands;

/// Keeps portfolio project records in sync with their GitHub repositories.
#[derive(Parser, Debug)]
#[command(name = "portfolio-updater")]
#[command(about = "Sync portfolio projects with their GitHub repositories")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Store connection string (e.g. sqlite://portfolio.db)
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    pub database_url: Option<String>,

    /// GitHub API token
    #[arg(long, env = "GITHUB_TOKEN", global = true, hide_env_values = true)]
    pub github_token: Option<String>,

    /// Account that owns the tracked repositories
    #[arg(long, env = "GITHUB_USERNAME", global = true)]
    pub github_username: Option<String>,

    /// Seconds between update cycles
    #[arg(long, env = "SYNC_INTERVAL_SECS", global = true)]
    pub interval_secs: Option<String>,

    /// GitHub API root
    #[arg(long, env = "GITHUB_API_URL", global = true)]
    pub api_url: Option<String>,

    /// What a failing project does to the cycle: abort or skip
    #[arg(long, env = "FAILURE_POLICY", global = true)]
    pub failure_policy: Option<String>,

    /// Staleness comparison: inclusive (>=) or strict (>)
    #[arg(long, env = "STALENESS_RULE", global = true)]
    pub staleness_rule: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
