//! JSON error envelope for HTTP responses.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use picito_core::error::PicitoError;
use serde::Serialize;
use tracing::error;

/// An error rendered as `{ "error": ..., "timestamp": ... }`.
#[derive(Debug)]
pub struct ApiError(pub PicitoError);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    timestamp: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            PicitoError::Validation { .. } => StatusCode::BAD_REQUEST,
            PicitoError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            PicitoError::AuthorizationDenied { .. } => StatusCode::FORBIDDEN,
            PicitoError::NotFound { .. } => StatusCode::NOT_FOUND,
            PicitoError::AlreadyExists { .. }
            | PicitoError::LastOwnerViolation { .. }
            | PicitoError::ConcurrentModification { .. } => StatusCode::CONFLICT,
            PicitoError::Database(_) | PicitoError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<PicitoError> for ApiError {
    fn from(err: PicitoError) -> Self {
        Self(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self(PicitoError::validation(err.to_string()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(PicitoError::validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(PicitoError::validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(PicitoError::validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Store and internal details stay in the log.
        let message = if status.is_server_error() {
            error!(error = %self.0, "Request failed");
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let body = ErrorBody {
            error: message,
            timestamp: Utc::now().to_rfc3339(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn status_mapping() {
        let cases = [
            (PicitoError::validation("bad"), StatusCode::BAD_REQUEST),
            (
                PicitoError::AuthenticationFailed { reason: "x".into() },
                StatusCode::UNAUTHORIZED,
            ),
            (PicitoError::denied("no"), StatusCode::FORBIDDEN),
            (PicitoError::not_found("user", "u"), StatusCode::NOT_FOUND),
            (
                PicitoError::AlreadyExists { entity: "user".into() },
                StatusCode::CONFLICT,
            ),
            (
                PicitoError::LastOwnerViolation { organization_id: Uuid::new_v4() },
                StatusCode::CONFLICT,
            ),
            (
                PicitoError::Database("connection reset".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }

    #[tokio::test]
    async fn server_errors_hide_details() {
        let response = ApiError(PicitoError::Database("secret table layout".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Internal server error");
        assert!(body["timestamp"].as_str().is_some());
    }
}
