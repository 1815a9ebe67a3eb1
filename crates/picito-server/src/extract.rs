//! Request extractors: session identity and validated JSON bodies.

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use picito_core::error::PicitoError;
use picito_core::models::identity::Identity;
use serde::de::DeserializeOwned;
use tracing::debug;
use validator::Validate;

use crate::error::ApiError;
use crate::state::SharedState;

/// All `Cookie` headers of a request joined into one value.
fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.join("; "))
    }
}

/// The authenticated caller. Rejects with 401 when there is no valid
/// session.
pub struct CurrentUser(pub Identity);

impl FromRequestParts<SharedState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, ApiError> {
        let header = cookie_header(&parts.headers);
        match state.auth.resolve(header.as_deref()).await? {
            Some(identity) => Ok(Self(identity)),
            None => Err(PicitoError::AuthenticationFailed {
                reason: "no session".into(),
            }
            .into()),
        }
    }
}

/// The caller if a valid session is present. An invalid or expired
/// session is treated as anonymous.
pub struct MaybeUser(pub Option<Identity>);

impl FromRequestParts<SharedState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, ApiError> {
        let header = cookie_header(&parts.headers);
        match state.auth.resolve(header.as_deref()).await {
            Ok(identity) => Ok(Self(identity)),
            Err(PicitoError::AuthenticationFailed { reason }) => {
                debug!(%reason, "Ignoring invalid session on public route");
                Ok(Self(None))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// JSON body that is deserialized and then checked with [`Validate`].
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, ApiError> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Path parameters with rejections rendered as [`ApiError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query string with rejections rendered as [`ApiError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
