//! Organization endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use picito_org::NewOrganization;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiResult;
use crate::extract::{ApiPath, CurrentUser, ValidJson};
use crate::state::SharedState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrganizationRequest {
    #[validate(length(max = 1000))]
    pub name: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
}

pub async fn list(
    State(state): State<SharedState>,
    CurrentUser(actor): CurrentUser,
) -> ApiResult<impl IntoResponse> {
    let organisations = state.organizations.list_for_user(actor.user_id).await?;
    Ok(Json(json!({
        "count": organisations.len(),
        "organisations": organisations,
    })))
}

pub async fn create(
    State(state): State<SharedState>,
    CurrentUser(actor): CurrentUser,
    ValidJson(req): ValidJson<CreateOrganizationRequest>,
) -> ApiResult<impl IntoResponse> {
    let organisation = state
        .organizations
        .create(
            &actor,
            NewOrganization {
                name: req.name,
                description: req.description,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "organisation": organisation }))))
}

pub async fn delete(
    State(state): State<SharedState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.organizations.delete(&actor, id).await?;
    Ok(Json(json!({ "message": "Organization deleted" })))
}
