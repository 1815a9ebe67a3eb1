//! Session endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;
use picito_auth::session;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::error::ApiResult;
use crate::extract::{CurrentUser, ValidJson};
use crate::state::SharedState;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 3, max = 254))]
    pub email: String,
}

pub async fn login(
    State(state): State<SharedState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let output = state.auth.login(&req.email).await?;
    let cookie = session::session_cookie(&output.token, state.auth.config());

    Ok((
        [(SET_COOKIE, cookie)],
        Json(json!({
            "user": output.user,
            "expires_in": output.expires_in,
        })),
    ))
}

pub async fn logout(State(state): State<SharedState>) -> impl IntoResponse {
    let cookie = session::clear_session_cookie(state.auth.config());
    ([(SET_COOKIE, cookie)], Json(json!({ "message": "Logged out" })))
}

pub async fn me(CurrentUser(identity): CurrentUser) -> Json<serde_json::Value> {
    Json(json!({ "user": identity }))
}
