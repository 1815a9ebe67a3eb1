//! Settings endpoints.

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::error::ApiResult;
use crate::extract::{ApiPath, CurrentUser, ValidJson};
use crate::state::SharedState;

#[derive(Debug, Deserialize, Validate)]
pub struct PutSettingRequest {
    pub value: serde_json::Value,
    /// Omit to create the key; pass the current revision to replace it.
    pub expected_revision: Option<u64>,
}

pub async fn get(
    State(state): State<SharedState>,
    ApiPath(key): ApiPath<String>,
) -> ApiResult<impl IntoResponse> {
    let setting = state.settings.get(&key).await?;
    Ok(Json(json!({ "setting": setting })))
}

pub async fn list(
    State(state): State<SharedState>,
    CurrentUser(actor): CurrentUser,
) -> ApiResult<impl IntoResponse> {
    let settings = state.settings.list(&actor).await?;
    Ok(Json(json!({ "settings": settings })))
}

pub async fn put(
    State(state): State<SharedState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(key): ApiPath<String>,
    ValidJson(req): ValidJson<PutSettingRequest>,
) -> ApiResult<impl IntoResponse> {
    let setting = state
        .settings
        .put(&actor, &key, req.value, req.expected_revision)
        .await?;
    Ok(Json(json!({ "setting": setting })))
}
