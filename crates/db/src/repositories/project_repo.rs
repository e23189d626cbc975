//! Repository for the `projects` table.
//!
//! Every method takes the caller's [`OwnerScope`] and binds its owner id into
//! the statement, so rows belonging to other users are never read, updated
//! or deleted through this type.

use sqlx::types::Json;
use sqlx::PgPool;
use tracker_core::metadata::ProjectMetadata;
use tracker_core::ownership::OwnerScope;
use tracker_core::types::DbId;

use crate::models::project::{CreateProject, Project, UpdateProject};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, name, description, metadata, created_at, updated_at";

/// Provides owner-scoped CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project owned by `scope`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        scope: &OwnerScope,
        input: &CreateProject,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (owner_id, name, description, metadata)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(scope.owner_id())
            .bind(&input.name)
            .bind(&input.description)
            .bind(Json(&input.metadata))
            .fetch_one(pool)
            .await
    }

    /// Find one of the caller's projects by ID.
    ///
    /// Returns `None` both when the row does not exist and when it belongs
    /// to another owner.
    pub async fn find_by_id(
        pool: &PgPool,
        scope: &OwnerScope,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 AND owner_id = $2");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(scope.owner_id())
            .fetch_optional(pool)
            .await
    }

    /// List the caller's projects, most recently created first.
    pub async fn list(pool: &PgPool, scope: &OwnerScope) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE owner_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(scope.owner_id())
            .fetch_all(pool)
            .await
    }

    /// Update one of the caller's projects. Only non-`None` fields in `input`
    /// are applied; `updated_at` is always refreshed.
    ///
    /// Returns `None` if no row with the given `id` is visible to `scope`.
    pub async fn update(
        pool: &PgPool,
        scope: &OwnerScope,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                metadata = COALESCE($5, metadata),
                updated_at = NOW()
             WHERE id = $1 AND owner_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(scope.owner_id())
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.metadata.as_ref().map(Json))
            .fetch_optional(pool)
            .await
    }

    /// Read-modify-write the metadata document of one of the caller's projects.
    ///
    /// The row is locked for the duration of the transaction, so concurrent
    /// calls apply their changes one after the other instead of losing keys.
    /// Returns `None` if no row with the given `id` is visible to `scope`.
    pub async fn update_metadata<F>(
        pool: &PgPool,
        scope: &OwnerScope,
        id: DbId,
        mutate: F,
    ) -> Result<Option<Project>, sqlx::Error>
    where
        F: FnOnce(&mut ProjectMetadata) + Send,
    {
        let mut tx = pool.begin().await?;

        let current: Option<(Json<ProjectMetadata>,)> = sqlx::query_as(
            "SELECT metadata FROM projects WHERE id = $1 AND owner_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(scope.owner_id())
        .fetch_optional(&mut *tx)
        .await?;

        let Some((Json(mut metadata),)) = current else {
            return Ok(None);
        };
        mutate(&mut metadata);

        let query = format!(
            "UPDATE projects SET metadata = $3, updated_at = NOW()
             WHERE id = $1 AND owner_id = $2
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(scope.owner_id())
            .bind(Json(&metadata))
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(project))
    }

    /// Permanently delete one of the caller's projects.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, scope: &OwnerScope, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(scope.owner_id())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
