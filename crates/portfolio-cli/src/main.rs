//! CLI entry point.
//!
//! Loads `.env`, parses arguments, initialises logging, then hands the
//! command to its handler. Configuration problems exit with code 78.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use portfolio_cli::{
    AppConfig, Cli, Commands, bootstrap, exit_code_for, handlers, open_store,
    resolve_database_url,
};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(verbose)
        .init();
}

async fn dispatch(mut cli: Cli) -> anyhow::Result<()> {
    let command = cli.command.take().unwrap_or(Commands::Run);

    match command {
        Commands::Run => {
            let config = AppConfig::from_cli(&cli)?;
            let ctx = bootstrap(&config).await?;
            handlers::run::execute(&ctx).await?;
        }
        Commands::Once => {
            let config = AppConfig::from_cli(&cli)?;
            let ctx = bootstrap(&config).await?;
            handlers::once::execute(&ctx).await?;
        }
        Commands::CheckConfig => {
            let config = AppConfig::from_cli(&cli)?;
            handlers::check_config::execute(&config);
        }
        Commands::Projects { command } => {
            let store = open_store(&resolve_database_url(&cli)?).await?;
            handlers::projects::execute(&store, command).await?;
        }
        Commands::Errors { limit } => {
            let store = open_store(&resolve_database_url(&cli)?).await?;
            handlers::errors::execute(&store, limit).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Before parsing, so clap's env fallbacks see .env values.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}
