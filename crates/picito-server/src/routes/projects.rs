//! Project endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use picito_core::models::project::{UpdateProject, Visibility};
use picito_org::NewProject;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiResult;
use crate::extract::{ApiPath, CurrentUser, MaybeUser, ValidJson};
use crate::state::SharedState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(max = 1000))]
    pub name: String,
    #[validate(length(max = 2048))]
    pub embed_url: String,
    #[validate(length(max = 256))]
    pub version: String,
    #[serde(default = "default_visibility")]
    pub visibility: Visibility,
}

fn default_visibility() -> Visibility {
    Visibility::Private
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(max = 1000))]
    pub name: Option<String>,
    #[validate(length(max = 2048))]
    pub embed_url: Option<String>,
    #[validate(length(max = 256))]
    pub version: Option<String>,
    pub visibility: Option<Visibility>,
}

pub async fn list(
    State(state): State<SharedState>,
    MaybeUser(actor): MaybeUser,
) -> ApiResult<impl IntoResponse> {
    let projects = state.projects.list(actor.as_ref()).await?;
    Ok(Json(json!({
        "count": projects.len(),
        "projects": projects,
    })))
}

pub async fn get(
    State(state): State<SharedState>,
    MaybeUser(actor): MaybeUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let project = state.projects.get(actor.as_ref(), id).await?;
    Ok(Json(json!({ "project": project })))
}

pub async fn create(
    State(state): State<SharedState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(organization_id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<CreateProjectRequest>,
) -> ApiResult<impl IntoResponse> {
    let project = state
        .projects
        .create(
            &actor,
            organization_id,
            NewProject {
                name: req.name,
                embed_url: req.embed_url,
                version: req.version,
                visibility: req.visibility,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "project": project }))))
}

pub async fn update(
    State(state): State<SharedState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<UpdateProjectRequest>,
) -> ApiResult<impl IntoResponse> {
    let changes = UpdateProject {
        name: req.name,
        embed_url: req.embed_url,
        version: req.version,
        visibility: req.visibility,
    };
    let project = state.projects.update(&actor, id, changes).await?;
    Ok(Json(json!({ "project": project })))
}

pub async fn delete(
    State(state): State<SharedState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.projects.delete(&actor, id).await?;
    Ok(Json(json!({ "message": "Project deleted" })))
}
