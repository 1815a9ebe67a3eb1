//! Membership store orchestration: who belongs to an organization and
//! with which role.
//!
//! Every role change and removal runs under the organization's lock,
//! re-reads the membership, checks [`ensure_owner_remains`] against a
//! fresh owner count and then issues a conditional write that repeats
//! the same check in the store.

use picito_core::error::{PicitoError, PicitoResult};
use picito_core::models::identity::Identity;
use picito_core::models::membership::{CreateMembership, Membership};
use picito_core::models::role::OrgRole;
use picito_core::ownership::{MembershipChange, ensure_owner_remains};
use picito_core::permission::{GlobalAction, OrgAction, can_manage_role, has_permission};
use picito_core::repository::{MembershipRepository, OrganizationRepository, UserRepository};
use picito_core::validation::normalize_email;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::access::{org_role, require_org};
use crate::locks::OrgLocks;

/// A membership together with the member's email.
#[derive(Debug, Clone, Serialize)]
pub struct MemberEntry {
    #[serde(flatten)]
    pub membership: Membership,
    pub email: String,
}

/// Creates the initial owner membership of a freshly created
/// organization.
pub async fn add_owner<M: MembershipRepository>(
    memberships: &M,
    user_id: Uuid,
    organization_id: Uuid,
) -> PicitoResult<Membership> {
    memberships
        .create(CreateMembership {
            user_id,
            organization_id,
            role: OrgRole::Owner,
        })
        .await
}

pub struct MembershipService<M, U, O>
where
    M: MembershipRepository,
    U: UserRepository,
    O: OrganizationRepository,
{
    memberships: M,
    users: U,
    organizations: O,
    locks: OrgLocks,
}

impl<M, U, O> MembershipService<M, U, O>
where
    M: MembershipRepository,
    U: UserRepository,
    O: OrganizationRepository,
{
    pub fn new(memberships: M, users: U, organizations: O, locks: OrgLocks) -> Self {
        Self {
            memberships,
            users,
            organizations,
            locks,
        }
    }

    pub async fn add_owner(&self, user_id: Uuid, organization_id: Uuid) -> PicitoResult<Membership> {
        add_owner(&self.memberships, user_id, organization_id).await
    }

    /// Adds an existing user to an organization.
    ///
    /// Global admins may assign any role. Otherwise the actor needs
    /// `ManageMembers` and must be allowed to manage `role`. Runs under
    /// the organization's lock so it cannot interleave with a delete of
    /// the same organization.
    pub async fn add_member(
        &self,
        actor: &Identity,
        organization_id: Uuid,
        email: &str,
        role: OrgRole,
    ) -> PicitoResult<Membership> {
        let _guard = self.locks.lock(organization_id).await;
        self.organizations.get_by_id(organization_id).await?;
        self.authorize_manage(actor, organization_id, &[role]).await?;

        let email = normalize_email(email)?;
        let user = self.users.get_by_email(&email).await?;

        let membership = self
            .memberships
            .create(CreateMembership {
                user_id: user.id,
                organization_id,
                role,
            })
            .await?;

        info!(
            membership_id = %membership.id,
            organization_id = %organization_id,
            user_id = %user.id,
            role = %role,
            actor = %actor.user_id,
            "Membership added"
        );
        Ok(membership)
    }

    /// Changes the role of a membership.
    ///
    /// Fails with `NotFound`, `AuthorizationDenied`, or
    /// `LastOwnerViolation` when the organization would lose its last
    /// owner; nothing is written on failure.
    pub async fn change_role(
        &self,
        actor: &Identity,
        membership_id: Uuid,
        role: OrgRole,
    ) -> PicitoResult<Membership> {
        let organization_id = self.memberships.get_by_id(membership_id).await?.organization_id;
        let _guard = self.locks.lock(organization_id).await;

        let current = self.memberships.get_by_id(membership_id).await?;
        self.authorize_manage(actor, organization_id, &[current.role, role])
            .await?;

        if current.role == role {
            return Ok(current);
        }

        let change = MembershipChange::SetRole(role);
        self.ensure_owner_remains(&current, change).await?;

        let updated = self
            .memberships
            .update_role(membership_id, current.role, role)
            .await?;

        info!(
            membership_id = %membership_id,
            organization_id = %organization_id,
            from = %current.role,
            to = %role,
            actor = %actor.user_id,
            "Membership role changed"
        );
        Ok(updated)
    }

    /// Removes a membership under the same guard as [`Self::change_role`].
    pub async fn remove(&self, actor: &Identity, membership_id: Uuid) -> PicitoResult<()> {
        let organization_id = self.memberships.get_by_id(membership_id).await?.organization_id;
        let _guard = self.locks.lock(organization_id).await;

        let current = self.memberships.get_by_id(membership_id).await?;
        self.authorize_manage(actor, organization_id, &[current.role])
            .await?;

        self.ensure_owner_remains(&current, MembershipChange::Remove)
            .await?;
        self.memberships.delete(membership_id, current.role).await?;

        info!(
            membership_id = %membership_id,
            organization_id = %organization_id,
            actor = %actor.user_id,
            "Membership removed"
        );
        Ok(())
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> PicitoResult<Vec<Membership>> {
        self.memberships.list_by_user(user_id).await
    }

    /// Members of an organization, oldest first. Visible to members and
    /// global admins.
    pub async fn list_for_organization(
        &self,
        actor: &Identity,
        organization_id: Uuid,
    ) -> PicitoResult<Vec<MemberEntry>> {
        self.organizations.get_by_id(organization_id).await?;
        if !has_permission(Some(actor.role), GlobalAction::ManageAnyMembership) {
            let role = org_role(&self.memberships, organization_id, actor).await?;
            require_org(role, OrgAction::ViewMembers)?;
        }

        let memberships = self.memberships.list_by_organization(organization_id).await?;
        let mut entries = Vec::with_capacity(memberships.len());
        for membership in memberships {
            let user = self.users.get_by_id(membership.user_id).await?;
            entries.push(MemberEntry {
                membership,
                email: user.email,
            });
        }
        Ok(entries)
    }

    async fn ensure_owner_remains(
        &self,
        current: &Membership,
        change: MembershipChange,
    ) -> PicitoResult<()> {
        if !change.drops_owner(current.role) {
            return Ok(());
        }
        let others = self
            .memberships
            .count_owners(current.organization_id, Some(current.id))
            .await?;
        ensure_owner_remains(current, change, others).inspect_err(|_| {
            warn!(
                membership_id = %current.id,
                organization_id = %current.organization_id,
                "Rejected change that would remove the last owner"
            );
        })
    }

    /// Global admins pass; anyone else needs `ManageMembers` in the
    /// organization and must be able to manage every role in `targets`.
    async fn authorize_manage(
        &self,
        actor: &Identity,
        organization_id: Uuid,
        targets: &[OrgRole],
    ) -> PicitoResult<()> {
        if has_permission(Some(actor.role), GlobalAction::ManageAnyMembership) {
            return Ok(());
        }

        let acting = org_role(&self.memberships, organization_id, actor).await?;
        require_org(acting, OrgAction::ManageMembers)?;

        let Some(acting) = acting else {
            return Err(PicitoError::denied("not a member of this organization"));
        };
        match targets.iter().find(|t| !can_manage_role(acting, **t)) {
            Some(target) => Err(PicitoError::denied(format!(
                "role {acting} may not manage role {target}"
            ))),
            None => Ok(()),
        }
    }
}
