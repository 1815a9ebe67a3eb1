//! Signed, time-limited session tokens (HS256 JWT).

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use picito_core::models::role::GlobalRole;
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::AuthError;

/// What a session token vouches for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub email: String,
    pub role: GlobalRole,
}

/// JWT claims embedded in every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub email: String,
    pub role: GlobalRole,
    /// Issuer.
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

impl SessionClaims {
    pub fn identity(&self) -> SessionIdentity {
        SessionIdentity {
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Issue a session token valid for `config.session_lifetime_secs` from now.
pub fn issue(identity: &SessionIdentity, config: &AuthConfig) -> Result<String, AuthError> {
    issue_at(identity, Utc::now(), config)
}

/// Issue a session token as if it had been issued at `issued_at`.
pub fn issue_at(
    identity: &SessionIdentity,
    issued_at: DateTime<Utc>,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let iat = issued_at.timestamp();
    let exp = i64::try_from(config.session_lifetime_secs)
        .ok()
        .and_then(|lifetime| iat.checked_add(lifetime))
        .ok_or_else(|| {
            AuthError::Crypto(format!(
                "session lifetime of {}s is out of range",
                config.session_lifetime_secs
            ))
        })?;
    let claims = SessionClaims {
        email: identity.email.clone(),
        role: identity.role,
        iss: config.jwt_issuer.clone(),
        iat,
        exp,
    };

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

/// Check signature, issuer and expiry and return the claims.
///
/// Every failure, expiry included, is reported as
/// [`AuthError::InvalidToken`].
pub fn verify(token: &str, config: &AuthConfig) -> Result<SessionClaims, AuthError> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_issuer(&[&config.jwt_issuer]);
    validation.set_required_spec_claims(&["exp", "iat", "iss"]);

    jsonwebtoken::decode::<SessionClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AuthError::InvalidToken("session expired".into())
            }
            _ => AuthError::InvalidToken(e.to_string()),
        })
}
