//! Authenticated identity carried through service calls.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::role::GlobalRole;
use crate::models::user::User;

/// The caller of an operation, resolved from a verified session and
/// re-read from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub role: GlobalRole,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }
}
