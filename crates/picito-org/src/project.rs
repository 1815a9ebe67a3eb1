//! Projects: iframe embeds owned by an organization, public or private.

use picito_core::error::{PicitoError, PicitoResult};
use picito_core::models::identity::Identity;
use picito_core::models::project::{CreateProject, Project, UpdateProject, Visibility};
use picito_core::permission::{GlobalAction, OrgAction, has_permission};
use picito_core::repository::{MembershipRepository, OrganizationRepository, ProjectRepository};
use picito_core::validation;
use tracing::info;
use uuid::Uuid;

use crate::access::{org_role, require_org};
use crate::locks::OrgLocks;

#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub embed_url: String,
    pub version: String,
    pub visibility: Visibility,
}

pub struct ProjectService<P, M, O>
where
    P: ProjectRepository,
    M: MembershipRepository,
    O: OrganizationRepository,
{
    projects: P,
    memberships: M,
    organizations: O,
    locks: OrgLocks,
}

impl<P, M, O> ProjectService<P, M, O>
where
    P: ProjectRepository,
    M: MembershipRepository,
    O: OrganizationRepository,
{
    pub fn new(projects: P, memberships: M, organizations: O, locks: OrgLocks) -> Self {
        Self {
            projects,
            memberships,
            organizations,
            locks,
        }
    }

    /// Creates a project under the organization's lock, so a concurrent
    /// delete of the organization either runs first (and this fails with
    /// `NotFound`) or removes the new project with the rest.
    pub async fn create(
        &self,
        actor: &Identity,
        organization_id: Uuid,
        input: NewProject,
    ) -> PicitoResult<Project> {
        let _guard = self.locks.lock(organization_id).await;
        self.organizations.get_by_id(organization_id).await?;
        self.authorize(actor, organization_id, OrgAction::CreateProject)
            .await?;

        let project = self
            .projects
            .create(CreateProject {
                organization_id,
                name: validation::project_name(&input.name)?,
                embed_url: validation::embed_url(&input.embed_url)?,
                version: validation::semantic_version(&input.version)?,
                visibility: input.visibility,
            })
            .await?;

        info!(
            project_id = %project.id,
            organization_id = %organization_id,
            visibility = project.visibility.as_str(),
            "Project created"
        );
        Ok(project)
    }

    /// Applies the fields present in `changes`.
    pub async fn update(
        &self,
        actor: &Identity,
        id: Uuid,
        changes: UpdateProject,
    ) -> PicitoResult<Project> {
        let project = self.projects.get_by_id(id).await?;
        self.authorize(actor, project.organization_id, OrgAction::EditProject)
            .await?;

        let changes = UpdateProject {
            name: changes.name.as_deref().map(validation::project_name).transpose()?,
            embed_url: changes.embed_url.as_deref().map(validation::embed_url).transpose()?,
            version: changes
                .version
                .as_deref()
                .map(validation::semantic_version)
                .transpose()?,
            visibility: changes.visibility,
        };

        let updated = self.projects.update(id, changes).await?;
        info!(project_id = %id, "Project updated");
        Ok(updated)
    }

    pub async fn delete(&self, actor: &Identity, id: Uuid) -> PicitoResult<()> {
        let project = self.projects.get_by_id(id).await?;
        self.authorize(actor, project.organization_id, OrgAction::DeleteProject)
            .await?;

        self.projects.delete(id).await?;
        info!(project_id = %id, organization_id = %project.organization_id, "Project deleted");
        Ok(())
    }

    /// Private projects are reported as missing to callers who may not
    /// see them.
    pub async fn get(&self, actor: Option<&Identity>, id: Uuid) -> PicitoResult<Project> {
        let project = self.projects.get_by_id(id).await?;
        if project.visibility == Visibility::Public {
            return Ok(project);
        }

        let visible = match actor {
            Some(actor) if has_permission(Some(actor.role), GlobalAction::ViewAllProjects) => true,
            Some(actor) => {
                let role = org_role(&self.memberships, project.organization_id, actor).await?;
                has_permission(role, OrgAction::ViewPrivateProjects)
            }
            None => false,
        };

        if visible {
            Ok(project)
        } else {
            Err(PicitoError::not_found("project", id))
        }
    }

    /// Public projects plus the private projects the caller may see.
    pub async fn list(&self, actor: Option<&Identity>) -> PicitoResult<Vec<Project>> {
        match actor {
            Some(actor) if has_permission(Some(actor.role), GlobalAction::ViewAllProjects) => {
                self.projects.list_all().await
            }
            Some(actor) => self.projects.list_visible(Some(actor.user_id)).await,
            None => self.projects.list_visible(None).await,
        }
    }

    async fn authorize(
        &self,
        actor: &Identity,
        organization_id: Uuid,
        action: OrgAction,
    ) -> PicitoResult<()> {
        if has_permission(Some(actor.role), GlobalAction::ManageAnyProject) {
            return Ok(());
        }
        let role = org_role(&self.memberships, organization_id, actor).await?;
        require_org(role, action)
    }
}
