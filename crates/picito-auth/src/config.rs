//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Configuration for session issuance and verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret used to sign session tokens (HS256).
    pub jwt_secret: String,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Session lifetime in seconds (default: 86_400 = 24 hours).
    pub session_lifetime_secs: u64,
    /// Name of the cookie carrying the session token.
    pub cookie_name: String,
    /// Adds the `Secure` attribute to the session cookie.
    pub cookie_secure: bool,
    /// Emails that receive the global admin role when their user record
    /// is first created.
    pub bootstrap_admins: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: "picito".into(),
            session_lifetime_secs: 86_400,
            cookie_name: "picito_session".into(),
            cookie_secure: false,
            bootstrap_admins: Vec::new(),
        }
    }
}
