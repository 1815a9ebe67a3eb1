//! Picito Auth — session tokens, cookie transport and email login.

pub mod config;
pub mod error;
pub mod service;
pub mod session;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{AuthService, LoginOutput};
pub use token::{SessionClaims, SessionIdentity};
