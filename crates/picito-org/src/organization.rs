//! Organization lifecycle: create, list, delete and reconcile.

use chrono::{DateTime, Duration, Utc};
use picito_core::error::{PicitoError, PicitoResult};
use picito_core::models::identity::Identity;
use picito_core::models::organization::{CreateOrganization, Organization};
use picito_core::models::role::OrgRole;
use picito_core::permission::GlobalAction;
use picito_core::repository::{
    MembershipRepository, OrganizationRepository, Pagination, ProjectRepository,
};
use picito_core::slug::{candidate, slugify};
use picito_core::validation;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::access::require_global;
use crate::locks::OrgLocks;
use crate::membership::add_owner;

/// Give up after this many slug collisions.
const MAX_SLUG_ATTEMPTS: u32 = 1_000;

/// Organizations without memberships younger than this are left alone by
/// [`OrganizationService::reconcile`]; their create may still be running.
const RECONCILE_GRACE_SECS: i64 = 300;

#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub name: String,
    pub description: Option<String>,
}

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    pub scanned: u64,
    /// Memberships promoted to owner.
    pub promoted: Vec<Uuid>,
    /// Organizations without any membership that were deleted.
    pub deleted: Vec<Uuid>,
    /// Memberships removed because their organization no longer exists.
    pub orphaned_memberships: u64,
    /// Projects removed because their organization no longer exists.
    pub orphaned_projects: u64,
}

pub struct OrganizationService<O, M, P>
where
    O: OrganizationRepository,
    M: MembershipRepository,
    P: ProjectRepository,
{
    organizations: O,
    memberships: M,
    projects: P,
    locks: OrgLocks,
}

impl<O, M, P> OrganizationService<O, M, P>
where
    O: OrganizationRepository,
    M: MembershipRepository,
    P: ProjectRepository,
{
    pub fn new(organizations: O, memberships: M, projects: P, locks: OrgLocks) -> Self {
        Self {
            organizations,
            memberships,
            projects,
            locks,
        }
    }

    /// Creates an organization owned by `actor`.
    ///
    /// The slug comes from the name; collisions get `-1`, `-2`, ...
    /// appended. If the owner membership cannot be written the
    /// organization is deleted again.
    pub async fn create(&self, actor: &Identity, input: NewOrganization) -> PicitoResult<Organization> {
        require_global(actor, GlobalAction::CreateOrganization)?;

        let name = validation::organization_name(&input.name)?;
        let description = validation::description(input.description.as_deref().unwrap_or(""))?;
        let base = slugify(&name);
        if base.is_empty() {
            return Err(PicitoError::validation(
                "name must contain at least one ASCII letter or digit",
            ));
        }

        let organization = self.insert_with_unique_slug(&name, &base, &description).await?;

        if let Err(err) = add_owner(&self.memberships, actor.user_id, organization.id).await {
            warn!(
                organization_id = %organization.id,
                error = %err,
                "Owner membership failed, rolling back organization"
            );
            if let Err(rollback) = self.organizations.delete(organization.id).await {
                // Left for reconcile() to clean up.
                error!(
                    organization_id = %organization.id,
                    error = %rollback,
                    "Rollback of organization failed"
                );
            }
            return Err(err);
        }

        info!(
            organization_id = %organization.id,
            slug = %organization.slug,
            owner = %actor.user_id,
            "Organization created"
        );
        Ok(organization)
    }

    async fn insert_with_unique_slug(
        &self,
        name: &str,
        base: &str,
        description: &str,
    ) -> PicitoResult<Organization> {
        for attempt in 0..MAX_SLUG_ATTEMPTS {
            let input = CreateOrganization {
                name: name.to_string(),
                slug: candidate(base, attempt),
                description: description.to_string(),
            };
            match self.organizations.create(input).await {
                Ok(organization) => return Ok(organization),
                Err(PicitoError::AlreadyExists { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(PicitoError::AlreadyExists {
            entity: "organization".into(),
        })
    }

    pub async fn get(&self, id: Uuid) -> PicitoResult<Organization> {
        self.organizations.get_by_id(id).await
    }

    /// Organizations in which `user_id` holds a membership.
    pub async fn list_for_user(&self, user_id: Uuid) -> PicitoResult<Vec<Organization>> {
        self.organizations.list_for_user(user_id).await
    }

    /// Deletes an organization with its memberships and projects.
    ///
    /// Memberships go first so an interrupted delete leaves an
    /// organization without members, which [`Self::reconcile`] removes.
    pub async fn delete(&self, actor: &Identity, id: Uuid) -> PicitoResult<()> {
        require_global(actor, GlobalAction::DeleteOrganization)?;

        let _guard = self.locks.lock(id).await;
        self.organizations.get_by_id(id).await?;
        let memberships = self.memberships.delete_by_organization(id).await?;
        let projects = self.projects.delete_by_organization(id).await?;
        self.organizations.delete(id).await?;

        info!(
            organization_id = %id,
            memberships,
            projects,
            actor = %actor.user_id,
            "Organization deleted"
        );
        Ok(())
    }

    /// Repairs organizations left without an owner and removes
    /// memberships and projects that outlived their organization.
    pub async fn reconcile(&self) -> PicitoResult<ReconcileReport> {
        self.reconcile_created_before(Utc::now() - Duration::seconds(RECONCILE_GRACE_SECS))
            .await
    }

    /// Like [`Self::reconcile`], but only organizations created before
    /// `cutoff` are deleted for having no memberships.
    pub async fn reconcile_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> PicitoResult<ReconcileReport> {
        let mut report = ReconcileReport::default();
        let mut pagination = Pagination::default();

        let mut organizations = Vec::new();
        loop {
            let page = self.organizations.list(pagination.clone()).await?;
            let fetched = page.items.len() as u64;
            organizations.extend(page.items);
            if fetched == 0 || pagination.offset + fetched >= page.total {
                break;
            }
            pagination.offset += fetched;
        }

        for organization in organizations {
            report.scanned += 1;
            self.reconcile_one(&organization, cutoff, &mut report).await?;
        }

        // Deletes from another process can race inserts that checked the
        // organization just before it went away.
        report.orphaned_memberships = self.memberships.delete_orphaned().await?;
        report.orphaned_projects = self.projects.delete_orphaned().await?;
        if report.orphaned_memberships > 0 || report.orphaned_projects > 0 {
            warn!(
                memberships = report.orphaned_memberships,
                projects = report.orphaned_projects,
                "Removed records of deleted organizations"
            );
        }

        info!(
            scanned = report.scanned,
            promoted = report.promoted.len(),
            deleted = report.deleted.len(),
            "Reconciliation finished"
        );
        Ok(report)
    }

    async fn reconcile_one(
        &self,
        organization: &Organization,
        cutoff: DateTime<Utc>,
        report: &mut ReconcileReport,
    ) -> PicitoResult<()> {
        let _guard = self.locks.lock(organization.id).await;
        let members = self.memberships.list_by_organization(organization.id).await?;

        if members.iter().any(|m| m.role == OrgRole::Owner) {
            return Ok(());
        }

        if members.is_empty() {
            if organization.created_at >= cutoff {
                return Ok(());
            }
            self.projects.delete_by_organization(organization.id).await?;
            self.organizations.delete(organization.id).await?;
            warn!(organization_id = %organization.id, "Deleted organization without members");
            report.deleted.push(organization.id);
            return Ok(());
        }

        // Listed oldest first.
        let heir = members
            .iter()
            .find(|m| m.role == OrgRole::Admin)
            .or_else(|| members.first());
        if let Some(heir) = heir {
            self.memberships
                .update_role(heir.id, heir.role, OrgRole::Owner)
                .await?;
            warn!(
                organization_id = %organization.id,
                membership_id = %heir.id,
                "Promoted member of ownerless organization to owner"
            );
            report.promoted.push(heir.id);
        }
        Ok(())
    }
}
