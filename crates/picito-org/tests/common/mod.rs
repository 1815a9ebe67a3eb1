//! Shared fixtures for service tests.

#![allow(dead_code)]

use picito_core::models::identity::Identity;
use picito_core::models::role::GlobalRole;
use picito_core::models::user::CreateUser;
use picito_core::repository::UserRepository;
use picito_db::repository::{
    SurrealMembershipRepository, SurrealOrganizationRepository, SurrealProjectRepository,
    SurrealSettingRepository, SurrealUserRepository,
};
use picito_org::{
    AdminService, MembershipService, OrgLocks, OrganizationService, ProjectService,
    SettingsService,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

pub type Users = SurrealUserRepository<Db>;
pub type Orgs = SurrealOrganizationRepository<Db>;
pub type Memberships = SurrealMembershipRepository<Db>;
pub type Projects = SurrealProjectRepository<Db>;

pub struct Harness {
    pub users: Users,
    pub org_repo: Orgs,
    pub membership_repo: Memberships,
    pub project_repo: Projects,
    pub organizations: OrganizationService<Orgs, Memberships, Projects>,
    pub members: MembershipService<Memberships, Users, Orgs>,
    pub projects: ProjectService<Projects, Memberships, Orgs>,
    pub admin: AdminService<Users>,
    pub settings: SettingsService<SurrealSettingRepository<Db>>,
}

pub async fn db() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    picito_db::run_migrations(&db).await.unwrap();
    db
}

pub async fn harness() -> Harness {
    let db = db().await;
    let locks = OrgLocks::new();

    let users = SurrealUserRepository::new(db.clone());
    let org_repo = SurrealOrganizationRepository::new(db.clone());
    let membership_repo = SurrealMembershipRepository::new(db.clone());
    let project_repo = SurrealProjectRepository::new(db.clone());

    Harness {
        organizations: OrganizationService::new(
            org_repo.clone(),
            membership_repo.clone(),
            project_repo.clone(),
            locks.clone(),
        ),
        members: MembershipService::new(
            membership_repo.clone(),
            users.clone(),
            org_repo.clone(),
            locks.clone(),
        ),
        projects: ProjectService::new(
            project_repo.clone(),
            membership_repo.clone(),
            org_repo.clone(),
            locks,
        ),
        admin: AdminService::new(users.clone()),
        settings: SettingsService::new(SurrealSettingRepository::new(db)),
        users,
        org_repo,
        membership_repo,
        project_repo,
    }
}

pub async fn identity(users: &Users, email: &str, role: GlobalRole) -> Identity {
    let user = users
        .create(CreateUser {
            email: email.into(),
            role,
        })
        .await
        .unwrap();
    Identity::from(&user)
}
