//! Project entity model and DTOs.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use tracker_core::metadata::ProjectMetadata;
use tracker_core::ownership::Owned;
use tracker_core::types::{DbId, Timestamp};

/// A project row from the `projects` table.
///
/// Serializes as `{id, owner, name, description, metadata, created_at, updated_at}`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    #[serde(rename = "owner")]
    pub owner_id: DbId,
    pub name: String,
    pub description: String,
    pub metadata: Json<ProjectMetadata>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Owned for Project {
    const ENTITY: &'static str = "Project";

    fn id(&self) -> DbId {
        self.id
    }

    fn owner_id(&self) -> DbId {
        self.owner_id
    }
}

/// DTO for creating a new project. The owner comes from the caller's scope,
/// never from this struct.
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub name: String,
    pub description: String,
    pub metadata: ProjectMetadata,
}

/// DTO for updating an existing project. Only `Some` fields are applied;
/// `metadata` replaces the whole document.
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub metadata: Option<ProjectMetadata>,
}
