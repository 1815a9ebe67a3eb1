//! Shared application state.

use std::sync::Arc;

use picito_auth::{AuthConfig, AuthService};
use picito_db::repository::{
    SurrealMembershipRepository, SurrealOrganizationRepository, SurrealProjectRepository,
    SurrealSettingRepository, SurrealUserRepository,
};
use picito_org::{
    AdminService, MembershipService, OrgLocks, OrganizationService, ProjectService,
    SettingsService,
};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

type Users = SurrealUserRepository<Any>;
type Organizations = SurrealOrganizationRepository<Any>;
type Memberships = SurrealMembershipRepository<Any>;
type Projects = SurrealProjectRepository<Any>;

pub struct AppState {
    pub auth: AuthService<Users>,
    pub organizations: OrganizationService<Organizations, Memberships, Projects>,
    pub members: MembershipService<Memberships, Users, Organizations>,
    pub projects: ProjectService<Projects, Memberships, Organizations>,
    pub admin: AdminService<Users>,
    pub settings: SettingsService<SurrealSettingRepository<Any>>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(db: Surreal<Any>, auth: AuthConfig) -> Self {
        let locks = OrgLocks::new();
        let users = SurrealUserRepository::new(db.clone());
        let organizations = SurrealOrganizationRepository::new(db.clone());
        let memberships = SurrealMembershipRepository::new(db.clone());
        let projects = SurrealProjectRepository::new(db.clone());

        Self {
            auth: AuthService::new(users.clone(), auth),
            organizations: OrganizationService::new(
                organizations.clone(),
                memberships.clone(),
                projects.clone(),
                locks.clone(),
            ),
            members: MembershipService::new(
                memberships.clone(),
                users.clone(),
                organizations.clone(),
                locks.clone(),
            ),
            projects: ProjectService::new(projects, memberships, organizations, locks),
            admin: AdminService::new(users),
            settings: SettingsService::new(SurrealSettingRepository::new(db)),
        }
    }
}
