//! Integration tests for the versioned settings service.

mod common;

use common::{harness, identity};
use picito_core::error::PicitoError;
use picito_core::models::role::GlobalRole;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn admin_writes_and_anyone_reads() {
    let h = harness().await;
    let root = identity(&h.users, "root@example.com", GlobalRole::Admin).await;

    let created = h
        .settings
        .put(&root, "embed.theme", json!({"color": "teal"}), None)
        .await
        .unwrap();
    assert_eq!(created.revision, 1);
    assert_eq!(created.updated_by, Some(root.user_id));

    let replaced = h
        .settings
        .put(&root, "embed.theme", json!({"color": "navy"}), Some(1))
        .await
        .unwrap();
    assert_eq!(replaced.revision, 2);

    let read = h.settings.get("embed.theme").await.unwrap();
    assert_eq!(read.value, json!({"color": "navy"}));

    let all = h.settings.list(&root).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn stale_revision_conflicts() {
    let h = harness().await;
    let root = identity(&h.users, "root@example.com", GlobalRole::Admin).await;

    h.settings.put(&root, "banner", json!("hello"), None).await.unwrap();
    h.settings.put(&root, "banner", json!("hi"), Some(1)).await.unwrap();

    let err = h
        .settings
        .put(&root, "banner", json!("stale"), Some(1))
        .await
        .unwrap_err();
    assert!(matches!(err, PicitoError::ConcurrentModification { .. }));
    assert_eq!(h.settings.get("banner").await.unwrap().value, json!("hi"));
}

#[tokio::test]
async fn non_admins_and_bad_keys_are_rejected() {
    let h = harness().await;
    let root = identity(&h.users, "root@example.com", GlobalRole::Admin).await;
    let alice = identity(&h.users, "alice@example.com", GlobalRole::User).await;

    let err = h.settings.put(&alice, "banner", json!(1), None).await.unwrap_err();
    assert!(matches!(err, PicitoError::AuthorizationDenied { .. }));
    assert!(matches!(
        h.settings.list(&alice).await.unwrap_err(),
        PicitoError::AuthorizationDenied { .. }
    ));

    for key in ["", "Upper", "has space", &"k".repeat(65)] {
        let err = h.settings.put(&root, key, json!(1), None).await.unwrap_err();
        assert!(matches!(err, PicitoError::Validation { .. }), "{key:?}");
    }

    assert!(matches!(
        h.settings.get("missing").await.unwrap_err(),
        PicitoError::NotFound { .. }
    ));
}
