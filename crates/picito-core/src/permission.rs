//! Static role → action tables and role-management rules.
//!
//! Everything here is pure: no I/O and no panics. Permission checks are
//! deny-by-default; an action missing from a role's table is refused,
//! and an absent role (`None`) has no permissions at all.

use serde::{Deserialize, Serialize};

use crate::models::role::{GlobalRole, OrgRole};

/// Actions gated by an organization-scoped role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrgAction {
    ViewMembers,
    ManageMembers,
    ViewPrivateProjects,
    CreateProject,
    EditProject,
    DeleteProject,
}

/// Actions gated by the platform-wide role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlobalAction {
    CreateOrganization,
    DeleteOrganization,
    ManageAnyMembership,
    ManageAnyProject,
    ManageUsers,
    ManageSettings,
    ViewAllProjects,
}

/// A role with a fixed set of permitted actions.
pub trait PermissionTable: Copy {
    type Action: Copy + PartialEq + 'static;

    fn allowed_actions(self) -> &'static [Self::Action];
}

const OWNER_ACTIONS: &[OrgAction] = &[
    OrgAction::ViewMembers,
    OrgAction::ManageMembers,
    OrgAction::ViewPrivateProjects,
    OrgAction::CreateProject,
    OrgAction::EditProject,
    OrgAction::DeleteProject,
];

const ADMIN_ACTIONS: &[OrgAction] = &[
    OrgAction::ViewMembers,
    OrgAction::ManageMembers,
    OrgAction::ViewPrivateProjects,
    OrgAction::CreateProject,
    OrgAction::EditProject,
];

const MEMBER_ACTIONS: &[OrgAction] = &[OrgAction::ViewMembers, OrgAction::ViewPrivateProjects];

const PLATFORM_ADMIN_ACTIONS: &[GlobalAction] = &[
    GlobalAction::CreateOrganization,
    GlobalAction::DeleteOrganization,
    GlobalAction::ManageAnyMembership,
    GlobalAction::ManageAnyProject,
    GlobalAction::ManageUsers,
    GlobalAction::ManageSettings,
    GlobalAction::ViewAllProjects,
];

const PLATFORM_USER_ACTIONS: &[GlobalAction] = &[GlobalAction::CreateOrganization];

impl PermissionTable for OrgRole {
    type Action = OrgAction;

    fn allowed_actions(self) -> &'static [OrgAction] {
        match self {
            OrgRole::Owner => OWNER_ACTIONS,
            OrgRole::Admin => ADMIN_ACTIONS,
            OrgRole::Member => MEMBER_ACTIONS,
        }
    }
}

impl PermissionTable for GlobalRole {
    type Action = GlobalAction;

    fn allowed_actions(self) -> &'static [GlobalAction] {
        match self {
            GlobalRole::Admin => PLATFORM_ADMIN_ACTIONS,
            GlobalRole::User => PLATFORM_USER_ACTIONS,
        }
    }
}

/// Returns whether `role` may perform `action`.
pub fn has_permission<R: PermissionTable>(role: Option<R>, action: R::Action) -> bool {
    role.is_some_and(|r| r.allowed_actions().contains(&action))
}

/// Returns whether a member holding `acting` may assign, change or
/// remove a membership whose role is `target`.
///
/// Owners manage admins and members, admins manage members only, and
/// nobody manages an owner through this path.
pub fn can_manage_role(acting: OrgRole, target: OrgRole) -> bool {
    match acting {
        OrgRole::Owner => matches!(target, OrgRole::Admin | OrgRole::Member),
        OrgRole::Admin => matches!(target, OrgRole::Member),
        OrgRole::Member => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_manage_role_matrix() {
        assert!(can_manage_role(OrgRole::Admin, OrgRole::Member));
        assert!(!can_manage_role(OrgRole::Admin, OrgRole::Admin));
        assert!(!can_manage_role(OrgRole::Admin, OrgRole::Owner));
        assert!(can_manage_role(OrgRole::Owner, OrgRole::Admin));
        assert!(can_manage_role(OrgRole::Owner, OrgRole::Member));
        assert!(!can_manage_role(OrgRole::Owner, OrgRole::Owner));
        for target in OrgRole::ALL {
            assert!(!can_manage_role(OrgRole::Member, target));
        }
    }

    #[test]
    fn absent_role_has_no_permissions() {
        assert!(!has_permission::<OrgRole>(None, OrgAction::ViewMembers));
        assert!(!has_permission::<GlobalRole>(
            None,
            GlobalAction::CreateOrganization
        ));
    }

    #[test]
    fn unknown_role_string_is_denied() {
        let role = "superuser".parse::<OrgRole>().ok();
        assert!(!has_permission(role, OrgAction::ViewMembers));
    }

    #[test]
    fn org_table_is_deny_by_default() {
        assert!(has_permission(Some(OrgRole::Owner), OrgAction::DeleteProject));
        assert!(!has_permission(Some(OrgRole::Admin), OrgAction::DeleteProject));
        assert!(has_permission(Some(OrgRole::Admin), OrgAction::ManageMembers));
        assert!(!has_permission(Some(OrgRole::Member), OrgAction::ManageMembers));
        assert!(has_permission(Some(OrgRole::Member), OrgAction::ViewPrivateProjects));
    }

    #[test]
    fn global_table() {
        assert!(has_permission(Some(GlobalRole::Admin), GlobalAction::ManageUsers));
        assert!(!has_permission(Some(GlobalRole::User), GlobalAction::ManageUsers));
        assert!(has_permission(
            Some(GlobalRole::User),
            GlobalAction::CreateOrganization
        ));
    }
}
