//! Integration tests for platform user administration.

mod common;

use common::{harness, identity};
use picito_core::error::PicitoError;
use picito_core::models::role::GlobalRole;
use picito_core::repository::{Pagination, UserRepository};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn admin_lists_users_and_users_cannot() {
    let h = harness().await;
    let root = identity(&h.users, "root@example.com", GlobalRole::Admin).await;
    let alice = identity(&h.users, "alice@example.com", GlobalRole::User).await;

    let page = h.admin.list_users(&root, Pagination::default()).await.unwrap();
    assert_eq!(page.total, 2);

    let err = h.admin.list_users(&alice, Pagination::default()).await.unwrap_err();
    assert!(matches!(err, PicitoError::AuthorizationDenied { .. }));
}

#[tokio::test]
async fn admin_changes_global_role() {
    let h = harness().await;
    let root = identity(&h.users, "root@example.com", GlobalRole::Admin).await;
    identity(&h.users, "alice@example.com", GlobalRole::User).await;

    let promoted = h
        .admin
        .change_global_role(&root, "Alice@Example.com", GlobalRole::Admin)
        .await
        .unwrap();
    assert_eq!(promoted.role, GlobalRole::Admin);

    let demoted = h
        .admin
        .change_global_role(&root, "alice@example.com", GlobalRole::User)
        .await
        .unwrap();
    assert_eq!(demoted.role, GlobalRole::User);
}

#[tokio::test]
async fn self_demotion_is_rejected_and_role_kept() {
    let h = harness().await;
    let root = identity(&h.users, "root@example.com", GlobalRole::Admin).await;

    let err = h
        .admin
        .change_global_role(&root, "root@example.com", GlobalRole::User)
        .await
        .unwrap_err();
    assert!(matches!(err, PicitoError::Validation { .. }));

    let stored = h.users.get_by_id(root.user_id).await.unwrap();
    assert_eq!(stored.role, GlobalRole::Admin);
}

#[tokio::test]
async fn unknown_email_and_non_admin_actor() {
    let h = harness().await;
    let root = identity(&h.users, "root@example.com", GlobalRole::Admin).await;
    let alice = identity(&h.users, "alice@example.com", GlobalRole::User).await;

    let err = h
        .admin
        .change_global_role(&root, "ghost@example.com", GlobalRole::Admin)
        .await
        .unwrap_err();
    assert!(matches!(err, PicitoError::NotFound { .. }));

    let err = h
        .admin
        .change_global_role(&alice, "alice@example.com", GlobalRole::Admin)
        .await
        .unwrap_err();
    assert!(matches!(err, PicitoError::AuthorizationDenied { .. }));
}
