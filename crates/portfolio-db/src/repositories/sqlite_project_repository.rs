//! `SQLite` implementation of the `ProjectRepository` trait.

use async_trait::async_trait;
use sqlx::SqlitePool;

use portfolio_core::{NewProject, Project, ProjectRepository, RepositoryError};

use super::row_mappers::{
    LISTED_PROJECT_COLUMNS, format_timestamp, map_sqlx_error, row_to_listed_project,
    row_to_project,
};

/// `SQLite` implementation of the `ProjectRepository` trait.
pub struct SqliteProjectRepository {
    pool: SqlitePool,
}

impl SqliteProjectRepository {
    /// Create a new `SQLite` project repository.
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every project, active or not, with synced fields populated.
    ///
    /// Used by the CLI listing; the update cycle goes through `list_active`.
    pub async fn list_all(&self) -> Result<Vec<(Project, bool)>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, content, languages, logo_url, logo_alt_text, github_url, \
             project_url, is_active, updated_at FROM projects ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        rows.iter()
            .map(|row| {
                let active: bool = sqlx::Row::try_get(row, "is_active")
                    .map_err(|e| RepositoryError::Storage(e.to_string()))?;
                Ok((row_to_project(row)?, active))
            })
            .collect()
    }

    /// Fetch one project with synced fields populated.
    pub async fn get_by_id(&self, id: i64) -> Result<Project, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, content, languages, logo_url, logo_alt_text, github_url, \
             project_url, updated_at FROM projects WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Storage(e.to_string()))?
        .ok_or_else(|| RepositoryError::NotFound(format!("Project with ID {id}")))?;

        row_to_project(&row)
    }
}

#[async_trait]
impl ProjectRepository for SqliteProjectRepository {
    async fn list_active(&self) -> Result<Vec<Project>, RepositoryError> {
        let query = format!(
            "SELECT {LISTED_PROJECT_COLUMNS} FROM projects WHERE is_active = 1 ORDER BY id"
        );

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        rows.iter().map(row_to_listed_project).collect()
    }

    async fn update(&self, project: &Project) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE projects SET content = ?, languages = ?, logo_alt_text = ?, github_url = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&project.content)
        .bind(project.languages_csv())
        .bind(&project.logo_alt_text)
        .bind(&project.github_url)
        .bind(project.updated_at.as_ref().map(format_timestamp))
        .bind(project.id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(&e, &project.name))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Project with ID {}",
                project.id
            )));
        }

        tracing::debug!(project_id = project.id, "Project row updated");
        Ok(())
    }

    async fn insert(&self, project: &NewProject) -> Result<Project, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO projects (name, logo_url, project_url, is_active) VALUES (?, ?, ?, ?)",
        )
        .bind(&project.name)
        .bind(&project.logo_url)
        .bind(&project.project_url)
        .bind(project.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(&e, &project.name))?;

        Ok(Project::listed(
            result.last_insert_rowid(),
            project.name.clone(),
            project.logo_url.clone(),
            project.project_url.clone(),
            None,
        ))
    }

    async fn set_active(&self, id: i64, active: bool) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE projects SET is_active = ? WHERE id = ?")
            .bind(active)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Project with ID {id}")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;
    use chrono::{TimeZone, Utc};
    use portfolio_core::ProjectRefresh;

    async fn repo() -> SqliteProjectRepository {
        SqliteProjectRepository::new(setup_test_database().await.unwrap())
    }

    #[tokio::test]
    async fn test_insert_then_list_active() {
        let repo = repo().await;
        let created = repo
            .insert(&NewProject::new("demo", "https://img/demo.png").with_project_url("https://demo.dev"))
            .await
            .unwrap();

        let listed = repo.list_active().await.unwrap();
        assert_eq!(listed, vec![created.clone()]);
        assert_eq!(created.project_url.as_deref(), Some("https://demo.dev"));
        assert!(created.updated_at.is_none());
    }

    #[tokio::test]
    async fn test_list_active_skips_inactive_and_keeps_store_order() {
        let repo = repo().await;
        let a = repo.insert(&NewProject::new("a", "x")).await.unwrap();
        let b = repo.insert(&NewProject::new("b", "x")).await.unwrap();
        repo.insert(&NewProject::new("c", "x").with_active(false))
            .await
            .unwrap();
        let d = repo.insert(&NewProject::new("d", "x")).await.unwrap();
        repo.set_active(b.id, false).await.unwrap();

        let names: Vec<_> = repo
            .list_active()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec![a.name, d.name]);
    }

    #[tokio::test]
    async fn test_listing_leaves_synced_fields_unset() {
        let repo = repo().await;
        let mut project = repo.insert(&NewProject::new("demo", "x")).await.unwrap();
        project.apply_refresh(ProjectRefresh {
            content: "<h1>Demo</h1>".into(),
            languages: vec!["Go".into()],
            github_url: "https://github.com/u/demo".into(),
            refreshed_at: Utc::now(),
        });
        repo.update(&project).await.unwrap();

        let listed = repo.list_active().await.unwrap().remove(0);
        assert!(listed.content.is_none());
        assert!(listed.languages.is_empty());
        assert!(listed.logo_alt_text.is_none());
        assert!(listed.github_url.is_none());
        assert!(listed.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_update_persists_synced_fields() {
        let repo = repo().await;
        let mut project = repo.insert(&NewProject::new("demo", "x")).await.unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        project.apply_refresh(ProjectRefresh {
            content: "<h1>Demo</h1>".into(),
            languages: vec!["Go".into(), "Shell".into()],
            github_url: "https://github.com/u/demo".into(),
            refreshed_at: at,
        });

        repo.update(&project).await.unwrap();

        let stored = repo.get_by_id(project.id).await.unwrap();
        assert_eq!(stored, project);

        let (raw,): (String,) = sqlx::query_as("SELECT languages FROM projects WHERE id = ?")
            .bind(project.id)
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(raw, "Go,Shell");
    }

    #[tokio::test]
    async fn test_update_does_not_touch_identity_or_logo() {
        let repo = repo().await;
        let mut project = repo.insert(&NewProject::new("demo", "logo.png")).await.unwrap();
        project.logo_url = "changed.png".into();
        project.name = "renamed".into();
        repo.update(&project).await.unwrap();

        let stored = repo.get_by_id(project.id).await.unwrap();
        assert_eq!(stored.name, "demo");
        assert_eq!(stored.logo_url, "logo.png");
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let repo = repo().await;
        let ghost = Project::listed(42, "ghost", "x", None, None);
        let err = repo.update(&ghost).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_name_is_already_exists() {
        let repo = repo().await;
        repo.insert(&NewProject::new("demo", "x")).await.unwrap();
        let err = repo.insert(&NewProject::new("demo", "y")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists(ref name) if name == "demo"));
    }

    #[tokio::test]
    async fn test_set_active_unknown_id_is_not_found() {
        let repo = repo().await;
        let err = repo.set_active(7, true).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_all_reports_active_flag() {
        let repo = repo().await;
        repo.insert(&NewProject::new("on", "x")).await.unwrap();
        repo.insert(&NewProject::new("off", "x").with_active(false))
            .await
            .unwrap();

        let all = repo.list_all().await.unwrap();
        let flags: Vec<_> = all.iter().map(|(p, active)| (p.name.as_str(), *active)).collect();
        assert_eq!(flags, vec![("on", true), ("off", false)]);
    }

    #[tokio::test]
    async fn test_closed_pool_is_storage_error() {
        let pool = setup_test_database().await.unwrap();
        let repo = SqliteProjectRepository::new(pool.clone());
        pool.close().await;

        let err = repo.list_active().await.unwrap_err();
        assert!(matches!(err, RepositoryError::Storage(_)));
    }
}
