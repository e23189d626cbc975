//! Handlers for the `/projects` resource.
//!
//! Every handler takes [`AuthUser`] and runs under its [`OwnerScope`]: the
//! repository filters by owner, and each loaded row is re-checked with
//! [`OwnerScope::require`]. Another user's project is reported as 404.
//!
//! [`OwnerScope`]: tracker_core::ownership::OwnerScope
//! [`OwnerScope::require`]: tracker_core::ownership::OwnerScope::require

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracker_core::error::CoreError;
use tracker_core::metadata::ProjectMetadata;
use tracker_core::ownership::Owned;
use tracker_core::types::DbId;
use tracker_core::validation::{
    validate_metadata, validate_no_nul, validate_project_name, MSG_REQUIRED,
    PROJECT_NAME_MAX_LENGTH,
};
use tracker_db::models::project::{CreateProject, Project, UpdateProject};
use tracker_db::repositories::ProjectRepo;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{Path, ValidatedJson};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /projects`.
///
/// There is deliberately no `owner` field: a client-supplied owner is
/// ignored during deserialization.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(
        required(message = "This field is required."),
        length(
            max = PROJECT_NAME_MAX_LENGTH,
            message = "Ensure this field has no more than 255 characters."
        ),
        custom(function = "validate_project_name")
    )]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_no_nul"))]
    pub description: String,
    #[serde(default)]
    #[validate(custom(function = "validate_metadata"))]
    pub metadata: ProjectMetadata,
}

/// Request body for `PUT` and `PATCH /projects/{id}`.
///
/// `PUT` additionally requires `name`. Absent fields keep their stored value;
/// a present `metadata` replaces the whole document.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(
        length(
            max = PROJECT_NAME_MAX_LENGTH,
            message = "Ensure this field has no more than 255 characters."
        ),
        custom(function = "validate_project_name")
    )]
    pub name: Option<String>,
    #[validate(custom(function = "validate_no_nul"))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_metadata"))]
    pub metadata: Option<ProjectMetadata>,
}

impl From<UpdateProjectRequest> for UpdateProject {
    fn from(input: UpdateProjectRequest) -> Self {
        Self {
            name: input.name,
            description: input.description,
            metadata: input.metadata,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<Project>)> {
    let scope = auth.scope();
    let create_dto = CreateProject {
        name: input.name.unwrap_or_default(),
        description: input.description,
        metadata: input.metadata,
    };

    let project = ProjectRepo::create(&state.pool, &scope, &create_dto).await?;

    tracing::info!(user_id = auth.user_id, project_id = project.id, "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/v1/projects
pub async fn list(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Vec<Project>>> {
    let projects = ProjectRepo::list(&state.pool, &auth.scope()).await?;
    Ok(Json(projects))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    let scope = auth.scope();
    let project = ProjectRepo::find_by_id(&state.pool, &scope, id).await?;
    Ok(Json(scope.require(project, id)?))
}

/// PUT /api/v1/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateProjectRequest>,
) -> AppResult<Json<Project>> {
    if input.name.is_none() {
        return Err(CoreError::field("name", MSG_REQUIRED).into());
    }
    apply_update(&state, &auth, id, input.into()).await
}

/// PATCH /api/v1/projects/{id}
pub async fn patch(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateProjectRequest>,
) -> AppResult<Json<Project>> {
    apply_update(&state, &auth, id, input.into()).await
}

/// DELETE /api/v1/projects/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let scope = auth.scope();
    let deleted = ProjectRepo::delete(&state.pool, &scope, id).await?;
    if !deleted {
        return Err(CoreError::NotFound {
            entity: Project::ENTITY,
            id,
        }
        .into());
    }

    tracing::info!(user_id = auth.user_id, project_id = id, "Project deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/projects/{id}/complete
///
/// Merge `status = "completed"` into the project's metadata, keeping every
/// other key. Repeating the call returns the same document.
pub async fn complete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    let scope = auth.scope();
    let mut newly_completed = false;

    let project = ProjectRepo::update_metadata(&state.pool, &scope, id, |metadata| {
        newly_completed = metadata.mark_completed();
    })
    .await?;
    let project = scope.require(project, id)?;

    tracing::info!(
        user_id = auth.user_id,
        project_id = id,
        status = project.metadata.0.status().as_str(),
        newly_completed,
        "Project completed"
    );
    Ok(Json(project))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn apply_update(
    state: &AppState,
    auth: &AuthUser,
    id: DbId,
    input: UpdateProject,
) -> AppResult<Json<Project>> {
    let scope = auth.scope();
    let project = ProjectRepo::update(&state.pool, &scope, id, &input).await?;
    let project = scope.require(project, id)?;

    tracing::info!(user_id = auth.user_id, project_id = id, "Project updated");
    Ok(Json(project))
}
