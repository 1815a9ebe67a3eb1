//! The "at least one owner" invariant as an explicit precondition.
//!
//! Every operation that changes or removes a membership calls
//! [`ensure_owner_remains`] with a count read from the store at decision
//! time. The store then repeats the same condition inside its write so
//! that a concurrent change between the read and the write cannot
//! slip through.

use uuid::Uuid;

use crate::error::{PicitoError, PicitoResult};
use crate::models::membership::Membership;
use crate::models::role::OrgRole;

/// What is about to happen to a membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange {
    SetRole(OrgRole),
    Remove,
}

impl MembershipChange {
    /// Whether the change takes an owner seat away from `current`.
    pub fn drops_owner(&self, current: OrgRole) -> bool {
        current == OrgRole::Owner && *self != MembershipChange::SetRole(OrgRole::Owner)
    }
}

/// Fails with [`PicitoError::LastOwnerViolation`] when applying `change`
/// to `membership` would leave its organization without an owner.
///
/// `other_owners` counts owner memberships of the same organization
/// excluding `membership` itself.
pub fn ensure_owner_remains(
    membership: &Membership,
    change: MembershipChange,
    other_owners: u64,
) -> PicitoResult<()> {
    if change.drops_owner(membership.role) && other_owners == 0 {
        return Err(last_owner(membership.organization_id));
    }
    Ok(())
}

pub fn last_owner(organization_id: Uuid) -> PicitoError {
    PicitoError::LastOwnerViolation { organization_id }
}
