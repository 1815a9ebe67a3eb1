//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::role::GlobalRole;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Unique, normalized to lowercase.
    pub email: String,
    pub role: GlobalRole,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Must already be normalized (see [`crate::validation::normalize_email`]).
    pub email: String,
    pub role: GlobalRole,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub role: Option<GlobalRole>,
    pub last_login_at: Option<DateTime<Utc>>,
}
