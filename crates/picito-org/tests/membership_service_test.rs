//! Integration tests for membership management and the last-owner rule.

mod common;

use common::{Harness, harness, identity};
use picito_core::error::PicitoError;
use picito_core::models::identity::Identity;
use picito_core::models::organization::Organization;
use picito_core::models::role::{GlobalRole, OrgRole};
use picito_core::repository::MembershipRepository;
use picito_org::NewOrganization;
use pretty_assertions::assert_eq;

async fn org_owned_by(h: &Harness, owner: &Identity, name: &str) -> Organization {
    h.organizations
        .create(
            owner,
            NewOrganization {
                name: name.into(),
                description: None,
            },
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn sole_owner_is_protected_until_a_second_owner_joins() {
    let h = harness().await;
    let u = identity(&h.users, "u@example.com", GlobalRole::User).await;
    let v = identity(&h.users, "v@example.com", GlobalRole::User).await;
    let root = identity(&h.users, "root@example.com", GlobalRole::Admin).await;

    let org = org_owned_by(&h, &u, "Test Org").await;
    let u_membership = h.membership_repo.find(org.id, u.user_id).await.unwrap().unwrap();
    assert_eq!(u_membership.role, OrgRole::Owner);

    let err = h.members.remove(&root, u_membership.id).await.unwrap_err();
    assert!(matches!(err, PicitoError::LastOwnerViolation { .. }));
    assert!(h.membership_repo.get_by_id(u_membership.id).await.is_ok());

    h.members
        .add_member(&root, org.id, "v@example.com", OrgRole::Owner)
        .await
        .unwrap();

    h.members.remove(&root, u_membership.id).await.unwrap();

    let remaining = h.membership_repo.list_by_organization(org.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].user_id, v.user_id);
    assert_eq!(remaining[0].role, OrgRole::Owner);
}

#[tokio::test]
async fn demoting_last_owner_is_rejected_without_writing() {
    let h = harness().await;
    let u = identity(&h.users, "u@example.com", GlobalRole::User).await;
    let root = identity(&h.users, "root@example.com", GlobalRole::Admin).await;

    let org = org_owned_by(&h, &u, "Solo").await;
    let owner = h.membership_repo.find(org.id, u.user_id).await.unwrap().unwrap();

    for role in [OrgRole::Admin, OrgRole::Member] {
        let err = h.members.change_role(&root, owner.id, role).await.unwrap_err();
        assert!(matches!(err, PicitoError::LastOwnerViolation { .. }));
    }

    let stored = h.membership_repo.get_by_id(owner.id).await.unwrap();
    assert_eq!(stored.role, OrgRole::Owner);
}

#[tokio::test]
async fn concurrent_demotions_keep_one_owner() {
    let h = harness().await;
    let u = identity(&h.users, "u@example.com", GlobalRole::User).await;
    identity(&h.users, "v@example.com", GlobalRole::User).await;
    let root = identity(&h.users, "root@example.com", GlobalRole::Admin).await;

    let org = org_owned_by(&h, &u, "Pair").await;
    let first = h.membership_repo.find(org.id, u.user_id).await.unwrap().unwrap();
    let second = h
        .members
        .add_member(&root, org.id, "v@example.com", OrgRole::Owner)
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        h.members.change_role(&root, first.id, OrgRole::Member),
        h.members.change_role(&root, second.id, OrgRole::Member),
    );

    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1, "a = {a:?}, b = {b:?}");
    let failure = a.err().or(b.err()).unwrap();
    assert!(matches!(failure, PicitoError::LastOwnerViolation { .. }));
    assert_eq!(h.membership_repo.count_owners(org.id, None).await.unwrap(), 1);
}

#[tokio::test]
async fn org_admin_manages_members_only() {
    let h = harness().await;
    let owner = identity(&h.users, "owner@example.com", GlobalRole::User).await;
    let admin = identity(&h.users, "admin@example.com", GlobalRole::User).await;
    identity(&h.users, "m1@example.com", GlobalRole::User).await;
    identity(&h.users, "m2@example.com", GlobalRole::User).await;

    let org = org_owned_by(&h, &owner, "Managed").await;
    h.members
        .add_member(&owner, org.id, "admin@example.com", OrgRole::Admin)
        .await
        .unwrap();

    let member = h
        .members
        .add_member(&admin, org.id, "m1@example.com", OrgRole::Member)
        .await
        .unwrap();

    let err = h
        .members
        .add_member(&admin, org.id, "m2@example.com", OrgRole::Admin)
        .await
        .unwrap_err();
    assert!(matches!(err, PicitoError::AuthorizationDenied { .. }));

    let err = h
        .members
        .change_role(&admin, member.id, OrgRole::Admin)
        .await
        .unwrap_err();
    assert!(matches!(err, PicitoError::AuthorizationDenied { .. }));

    let owner_membership = h.membership_repo.find(org.id, owner.user_id).await.unwrap().unwrap();
    let err = h.members.remove(&admin, owner_membership.id).await.unwrap_err();
    assert!(matches!(err, PicitoError::AuthorizationDenied { .. }));

    h.members.remove(&admin, member.id).await.unwrap();
}

#[tokio::test]
async fn owner_cannot_assign_owner_but_global_admin_can() {
    let h = harness().await;
    let owner = identity(&h.users, "owner@example.com", GlobalRole::User).await;
    let root = identity(&h.users, "root@example.com", GlobalRole::Admin).await;
    identity(&h.users, "m@example.com", GlobalRole::User).await;

    let org = org_owned_by(&h, &owner, "Crown").await;
    let member = h
        .members
        .add_member(&owner, org.id, "m@example.com", OrgRole::Member)
        .await
        .unwrap();

    let promoted = h.members.change_role(&owner, member.id, OrgRole::Admin).await.unwrap();
    assert_eq!(promoted.role, OrgRole::Admin);

    let err = h
        .members
        .change_role(&owner, member.id, OrgRole::Owner)
        .await
        .unwrap_err();
    assert!(matches!(err, PicitoError::AuthorizationDenied { .. }));

    let crowned = h.members.change_role(&root, member.id, OrgRole::Owner).await.unwrap();
    assert_eq!(crowned.role, OrgRole::Owner);
}

#[tokio::test]
async fn plain_members_and_outsiders_manage_nothing() {
    let h = harness().await;
    let owner = identity(&h.users, "owner@example.com", GlobalRole::User).await;
    let member = identity(&h.users, "member@example.com", GlobalRole::User).await;
    let outsider = identity(&h.users, "out@example.com", GlobalRole::User).await;
    identity(&h.users, "new@example.com", GlobalRole::User).await;

    let org = org_owned_by(&h, &owner, "Closed").await;
    h.members
        .add_member(&owner, org.id, "member@example.com", OrgRole::Member)
        .await
        .unwrap();

    for actor in [&member, &outsider] {
        let err = h
            .members
            .add_member(actor, org.id, "new@example.com", OrgRole::Member)
            .await
            .unwrap_err();
        assert!(matches!(err, PicitoError::AuthorizationDenied { .. }));
    }
}

#[tokio::test]
async fn duplicate_and_unknown_members() {
    let h = harness().await;
    let owner = identity(&h.users, "owner@example.com", GlobalRole::User).await;
    identity(&h.users, "m@example.com", GlobalRole::User).await;

    let org = org_owned_by(&h, &owner, "Dupes").await;
    h.members
        .add_member(&owner, org.id, "m@example.com", OrgRole::Member)
        .await
        .unwrap();

    let err = h
        .members
        .add_member(&owner, org.id, "M@Example.com", OrgRole::Member)
        .await
        .unwrap_err();
    assert!(matches!(err, PicitoError::AlreadyExists { .. }));

    let err = h
        .members
        .add_member(&owner, org.id, "nobody@example.com", OrgRole::Member)
        .await
        .unwrap_err();
    assert!(matches!(err, PicitoError::NotFound { .. }));

    let err = h
        .members
        .change_role(&owner, uuid::Uuid::new_v4(), OrgRole::Member)
        .await
        .unwrap_err();
    assert!(matches!(err, PicitoError::NotFound { .. }));
}

#[tokio::test]
async fn member_listing_visibility() {
    let h = harness().await;
    let owner = identity(&h.users, "owner@example.com", GlobalRole::User).await;
    let member = identity(&h.users, "member@example.com", GlobalRole::User).await;
    let outsider = identity(&h.users, "out@example.com", GlobalRole::User).await;
    let root = identity(&h.users, "root@example.com", GlobalRole::Admin).await;

    let org = org_owned_by(&h, &owner, "Listed").await;
    h.members
        .add_member(&owner, org.id, "member@example.com", OrgRole::Member)
        .await
        .unwrap();

    let entries = h.members.list_for_organization(&member, org.id).await.unwrap();
    let emails: Vec<_> = entries.iter().map(|e| e.email.as_str()).collect();
    assert_eq!(emails, vec!["owner@example.com", "member@example.com"]);

    assert_eq!(h.members.list_for_organization(&root, org.id).await.unwrap().len(), 2);

    let err = h
        .members
        .list_for_organization(&outsider, org.id)
        .await
        .unwrap_err();
    assert!(matches!(err, PicitoError::AuthorizationDenied { .. }));

    let mine = h.members.list_for_user(member.user_id).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].organization_id, org.id);
}
