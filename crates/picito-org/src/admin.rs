//! Platform user administration.

use picito_core::error::{PicitoError, PicitoResult};
use picito_core::models::identity::Identity;
use picito_core::models::role::GlobalRole;
use picito_core::models::user::{UpdateUser, User};
use picito_core::permission::GlobalAction;
use picito_core::repository::{PaginatedResult, Pagination, UserRepository};
use picito_core::validation::normalize_email;
use tracing::{info, warn};

use crate::access::require_global;

pub struct AdminService<U: UserRepository> {
    users: U,
}

impl<U: UserRepository> AdminService<U> {
    pub fn new(users: U) -> Self {
        Self { users }
    }

    pub async fn list_users(
        &self,
        actor: &Identity,
        pagination: Pagination,
    ) -> PicitoResult<PaginatedResult<User>> {
        require_global(actor, GlobalAction::ManageUsers)?;
        self.users.list(pagination).await
    }

    /// Sets the global role of the user with `email`.
    ///
    /// An admin cannot demote themselves; the request is rejected as a
    /// validation error before anything is written.
    pub async fn change_global_role(
        &self,
        actor: &Identity,
        email: &str,
        role: GlobalRole,
    ) -> PicitoResult<User> {
        require_global(actor, GlobalAction::ManageUsers)?;
        let email = normalize_email(email)?;

        if email == actor.email && role != GlobalRole::Admin {
            warn!(user_id = %actor.user_id, "Rejected self-demotion");
            return Err(PicitoError::validation(
                "administrators cannot remove their own admin role",
            ));
        }

        let user = self.users.get_by_email(&email).await?;
        if user.role == role {
            return Ok(user);
        }

        let updated = self
            .users
            .update(
                user.id,
                UpdateUser {
                    role: Some(role),
                    ..UpdateUser::default()
                },
            )
            .await?;

        info!(
            user_id = %updated.id,
            from = %user.role,
            to = %role,
            actor = %actor.user_id,
            "Global role changed"
        );
        Ok(updated)
    }
}
