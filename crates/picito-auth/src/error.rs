//! Authentication error types.

use picito_core::error::PicitoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Tampered, malformed, expired or foreign token.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for PicitoError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken(_) => PicitoError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::Crypto(msg) => PicitoError::Internal(msg),
        }
    }
}
