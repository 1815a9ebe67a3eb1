//! Shared authorization helpers.

use picito_core::error::{PicitoError, PicitoResult};
use picito_core::models::identity::Identity;
use picito_core::models::role::OrgRole;
use picito_core::permission::{GlobalAction, OrgAction, has_permission};
use picito_core::repository::MembershipRepository;
use uuid::Uuid;

/// The actor's role inside `organization_id`, read from the store.
pub(crate) async fn org_role<M: MembershipRepository>(
    memberships: &M,
    organization_id: Uuid,
    actor: &Identity,
) -> PicitoResult<Option<OrgRole>> {
    Ok(memberships
        .find(organization_id, actor.user_id)
        .await?
        .map(|m| m.role))
}

pub(crate) fn require_global(actor: &Identity, action: GlobalAction) -> PicitoResult<()> {
    if has_permission(Some(actor.role), action) {
        Ok(())
    } else {
        Err(PicitoError::denied(format!(
            "global role {} may not perform {action:?}",
            actor.role
        )))
    }
}

pub(crate) fn require_org(role: Option<OrgRole>, action: OrgAction) -> PicitoResult<()> {
    if has_permission(role, action) {
        return Ok(());
    }
    Err(match role {
        Some(role) => PicitoError::denied(format!("organization role {role} may not perform {action:?}")),
        None => PicitoError::denied("not a member of this organization"),
    })
}
