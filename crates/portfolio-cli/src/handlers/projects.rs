//! Project maintenance handlers.
//!
//! Seeding and activation go straight to the store; only the update cycle
//! ever writes the synced fields.

use anyhow::Result;
use portfolio_core::{NewProject, ProjectRepository};

use crate::bootstrap::StoreContext;
use crate::commands::ProjectsCommand;
use crate::error::CliError;
use crate::presentation::{format_timestamp, print_separator, truncate_string};

/// Dispatch a `projects` subcommand.
pub async fn execute(store: &StoreContext, command: ProjectsCommand) -> Result<()> {
    match command {
        ProjectsCommand::List => list(store).await,
        ProjectsCommand::Add {
            name,
            logo_url,
            project_url,
            inactive,
        } => {
            let mut project = NewProject::new(name, logo_url).with_active(!inactive);
            if let Some(url) = project_url {
                project = project.with_project_url(url);
            }
            add(store, &project).await.map(|_| ())
        }
        ProjectsCommand::Activate { id } => set_active(store, id, true).await,
        ProjectsCommand::Deactivate { id } => set_active(store, id, false).await,
    }
}

/// Print every project with its sync state.
pub async fn list(store: &StoreContext) -> Result<()> {
    let projects = store.projects.list_all().await.map_err(CliError::from)?;

    if projects.is_empty() {
        println!("No projects found.");
        println!("Use 'portfolio-updater projects add <name> --logo-url <url>' to add one.");
        return Ok(());
    }

    println!("Found {} project(s):\n", projects.len());
    println!(
        "{:<4} {:<25} {:<7} {:<25} {:<20} GitHub URL",
        "ID", "Name", "Active", "Languages", "Updated"
    );
    print_separator(110);

    for (project, active) in projects {
        let languages = if project.languages.is_empty() {
            "--".to_string()
        } else {
            project.languages_csv()
        };
        println!(
            "{:<4} {:<25} {:<7} {:<25} {:<20} {}",
            project.id,
            truncate_string(&project.name, 24),
            if active { "yes" } else { "no" },
            truncate_string(&languages, 24),
            format_timestamp(project.updated_at.as_ref()),
            project.github_url.as_deref().unwrap_or("--"),
        );
    }

    Ok(())
}

/// Insert a project and print its id.
pub async fn add(store: &StoreContext, project: &NewProject) -> Result<i64> {
    let created = store
        .projects
        .insert(project)
        .await
        .map_err(CliError::from)?;

    println!(
        "Added project '{}' with ID {}{}",
        created.name,
        created.id,
        if project.is_active { "" } else { " (inactive)" }
    );
    Ok(created.id)
}

/// Flip a project's active flag.
pub async fn set_active(store: &StoreContext, id: i64, active: bool) -> Result<()> {
    store
        .projects
        .set_active(id, active)
        .await
        .map_err(CliError::from)?;

    let verb = if active { "Activated" } else { "Deactivated" };
    println!("{verb} project {id}");
    Ok(())
}
