//! Platform administration endpoints.

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use picito_core::error::PicitoError;
use picito_core::models::role::GlobalRole;
use picito_core::permission::{GlobalAction, has_permission};
use picito_core::repository::Pagination;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiQuery, CurrentUser, ValidJson};
use crate::state::SharedState;

#[derive(Debug, Deserialize, Validate)]
pub struct ListUsersQuery {
    #[serde(default)]
    pub offset: u64,
    #[validate(range(min = 1, max = 200))]
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    Pagination::default().limit
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangeGlobalRoleRequest {
    #[validate(length(min = 3, max = 254))]
    pub email: String,
    pub role: GlobalRole,
}

pub async fn list_users(
    State(state): State<SharedState>,
    CurrentUser(actor): CurrentUser,
    ApiQuery(query): ApiQuery<ListUsersQuery>,
) -> ApiResult<impl IntoResponse> {
    query.validate()?;

    let page = state
        .admin
        .list_users(
            &actor,
            Pagination {
                offset: query.offset,
                limit: query.limit,
            },
        )
        .await?;
    Ok(Json(json!({
        "users": page.items,
        "total": page.total,
        "offset": page.offset,
        "limit": page.limit,
    })))
}

pub async fn change_role(
    State(state): State<SharedState>,
    CurrentUser(actor): CurrentUser,
    ValidJson(req): ValidJson<ChangeGlobalRoleRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .admin
        .change_global_role(&actor, &req.email, req.role)
        .await?;
    Ok(Json(json!({ "user": user })))
}

pub async fn reconcile(
    State(state): State<SharedState>,
    CurrentUser(actor): CurrentUser,
) -> ApiResult<impl IntoResponse> {
    if !has_permission(Some(actor.role), GlobalAction::DeleteOrganization) {
        return Err(ApiError(PicitoError::denied("administrators only")));
    }
    let report = state.organizations.reconcile().await?;
    Ok(Json(json!({ "report": report })))
}
