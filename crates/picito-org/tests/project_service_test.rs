//! Integration tests for project visibility and authorization.

mod common;

use common::{Harness, harness, identity};
use picito_core::error::PicitoError;
use picito_core::models::identity::Identity;
use picito_core::models::organization::Organization;
use picito_core::models::project::{UpdateProject, Visibility};
use picito_core::models::role::{GlobalRole, OrgRole};
use picito_org::{NewOrganization, NewProject};
use pretty_assertions::assert_eq;

fn project(name: &str, visibility: Visibility) -> NewProject {
    NewProject {
        name: name.into(),
        embed_url: "https://embed.example.com/app".into(),
        version: "1.0.0".into(),
        visibility,
    }
}

async fn org(h: &Harness, owner: &Identity) -> Organization {
    h.organizations
        .create(
            owner,
            NewOrganization {
                name: "Studio".into(),
                description: None,
            },
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn private_projects_are_visible_to_members_only() {
    let h = harness().await;
    let owner = identity(&h.users, "owner@example.com", GlobalRole::User).await;
    let member = identity(&h.users, "member@example.com", GlobalRole::User).await;
    let outsider = identity(&h.users, "out@example.com", GlobalRole::User).await;
    let root = identity(&h.users, "root@example.com", GlobalRole::Admin).await;

    let org = org(&h, &owner).await;
    h.members
        .add_member(&owner, org.id, "member@example.com", OrgRole::Member)
        .await
        .unwrap();

    let public = h.projects.create(&owner, org.id, project("Public", Visibility::Public)).await.unwrap();
    let private = h.projects.create(&owner, org.id, project("Private", Visibility::Private)).await.unwrap();

    assert_eq!(h.projects.list(None).await.unwrap().len(), 1);
    assert_eq!(h.projects.list(Some(&outsider)).await.unwrap().len(), 1);
    assert_eq!(h.projects.list(Some(&member)).await.unwrap().len(), 2);
    assert_eq!(h.projects.list(Some(&root)).await.unwrap().len(), 2);

    assert!(h.projects.get(None, public.id).await.is_ok());
    assert!(h.projects.get(Some(&member), private.id).await.is_ok());
    assert!(h.projects.get(Some(&root), private.id).await.is_ok());
    for actor in [None, Some(&outsider)] {
        let err = h.projects.get(actor, private.id).await.unwrap_err();
        assert!(matches!(err, PicitoError::NotFound { .. }));
    }
}

#[tokio::test]
async fn project_mutations_follow_org_role() {
    let h = harness().await;
    let owner = identity(&h.users, "owner@example.com", GlobalRole::User).await;
    let admin = identity(&h.users, "admin@example.com", GlobalRole::User).await;
    let member = identity(&h.users, "member@example.com", GlobalRole::User).await;

    let org = org(&h, &owner).await;
    h.members.add_member(&owner, org.id, "admin@example.com", OrgRole::Admin).await.unwrap();
    h.members.add_member(&owner, org.id, "member@example.com", OrgRole::Member).await.unwrap();

    let err = h
        .projects
        .create(&member, org.id, project("Nope", Visibility::Public))
        .await
        .unwrap_err();
    assert!(matches!(err, PicitoError::AuthorizationDenied { .. }));

    let created = h.projects.create(&admin, org.id, project("Board", Visibility::Public)).await.unwrap();

    let updated = h
        .projects
        .update(
            &admin,
            created.id,
            UpdateProject {
                version: Some("1.1.0".into()),
                visibility: Some(Visibility::Private),
                ..UpdateProject::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.version, "1.1.0");
    assert_eq!(updated.visibility, Visibility::Private);
    assert_eq!(updated.name, "Board");

    let err = h.projects.delete(&admin, created.id).await.unwrap_err();
    assert!(matches!(err, PicitoError::AuthorizationDenied { .. }));

    h.projects.delete(&owner, created.id).await.unwrap();
    assert!(h.projects.get(Some(&owner), created.id).await.is_err());
}

#[tokio::test]
async fn invalid_project_fields_are_rejected() {
    let h = harness().await;
    let owner = identity(&h.users, "owner@example.com", GlobalRole::User).await;
    let org = org(&h, &owner).await;

    let bad = [
        NewProject { name: "X".into(), ..project("ok", Visibility::Public) },
        NewProject { embed_url: "ftp://example.com".into(), ..project("Okay", Visibility::Public) },
        NewProject { embed_url: "not a url".into(), ..project("Okay", Visibility::Public) },
        NewProject { version: "1.0".into(), ..project("Okay", Visibility::Public) },
    ];
    for input in bad {
        let err = h.projects.create(&owner, org.id, input).await.unwrap_err();
        assert!(matches!(err, PicitoError::Validation { .. }), "got {err:?}");
    }
    assert!(h.projects.list(Some(&owner)).await.unwrap().is_empty());
}
