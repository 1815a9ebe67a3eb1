//! Membership endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use picito_core::models::role::OrgRole;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiResult;
use crate::extract::{ApiPath, CurrentUser, ValidJson};
use crate::state::SharedState;

#[derive(Debug, Deserialize, Validate)]
pub struct AddMemberRequest {
    #[validate(length(min = 3, max = 254))]
    pub email: String,
    pub role: OrgRole,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangeRoleRequest {
    pub role: OrgRole,
}

pub async fn list(
    State(state): State<SharedState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(organization_id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let members = state
        .members
        .list_for_organization(&actor, organization_id)
        .await?;
    Ok(Json(json!({
        "count": members.len(),
        "members": members,
    })))
}

pub async fn add(
    State(state): State<SharedState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(organization_id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<AddMemberRequest>,
) -> ApiResult<impl IntoResponse> {
    let membership = state
        .members
        .add_member(&actor, organization_id, &req.email, req.role)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "membership": membership }))))
}

pub async fn change_role(
    State(state): State<SharedState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<ChangeRoleRequest>,
) -> ApiResult<impl IntoResponse> {
    let membership = state.members.change_role(&actor, id, req.role).await?;
    Ok(Json(json!({ "membership": membership })))
}

pub async fn remove(
    State(state): State<SharedState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.members.remove(&actor, id).await?;
    Ok(Json(json!({ "message": "Membership removed" })))
}
