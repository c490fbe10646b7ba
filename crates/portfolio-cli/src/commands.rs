//! Subcommands.

use clap::Subcommand;

/// Available commands. `run` is used when none is given.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the update cycle on a timer until interrupted (Ctrl-C)
    Run,

    /// Run a single update cycle now and print a summary
    Once,

    /// Manage tracked projects
    Projects {
        #[command(subcommand)]
        command: ProjectsCommand,
    },

    /// Show the newest entries of the error table
    Errors {
        /// Number of records to show
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },

    /// Load and validate configuration, then print it
    CheckConfig,
}

/// Project maintenance commands.
#[derive(Subcommand, Debug)]
pub enum ProjectsCommand {
    /// List every project with its sync state
    List,

    /// Add a project to track
    Add {
        /// Repository name on GitHub (also the display name)
        name: String,
        /// Logo image URL
        #[arg(long)]
        logo_url: String,
        /// Public URL of the running project
        #[arg(long)]
        project_url: Option<String>,
        /// Add without tracking it yet
        #[arg(long)]
        inactive: bool,
    },

    /// Start tracking a project
    Activate {
        /// Project ID
        id: i64,
    },

    /// Stop tracking a project (the record is kept)
    Deactivate {
        /// Project ID
        id: i64,
    },
}
