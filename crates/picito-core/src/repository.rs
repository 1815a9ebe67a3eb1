//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async and every call reaches the
//! store; implementations keep no authoritative in-memory state.

use uuid::Uuid;

use crate::error::PicitoResult;
use crate::models::{
    membership::{CreateMembership, Membership},
    organization::{CreateOrganization, Organization},
    project::{CreateProject, Project, UpdateProject},
    role::OrgRole,
    setting::{PutSetting, Setting},
    user::{CreateUser, UpdateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    /// Fails with `AlreadyExists` if the email is taken.
    fn create(&self, input: CreateUser) -> impl Future<Output = PicitoResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PicitoResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = PicitoResult<User>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = PicitoResult<User>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = PicitoResult<PaginatedResult<User>>> + Send;
}

// ---------------------------------------------------------------------------
// Organizations & memberships
// ---------------------------------------------------------------------------

pub trait OrganizationRepository: Send + Sync {
    /// Fails with `AlreadyExists` if the slug is taken.
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = PicitoResult<Organization>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PicitoResult<Organization>> + Send;
    fn get_by_slug(&self, slug: &str) -> impl Future<Output = PicitoResult<Organization>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = PicitoResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = PicitoResult<PaginatedResult<Organization>>> + Send;
    /// Organizations in which `user_id` holds any membership.
    fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = PicitoResult<Vec<Organization>>> + Send;
}

pub trait MembershipRepository: Send + Sync {
    /// Fails with `AlreadyExists` if the `(user_id, organization_id)`
    /// pair already has a membership.
    fn create(
        &self,
        input: CreateMembership,
    ) -> impl Future<Output = PicitoResult<Membership>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PicitoResult<Membership>> + Send;
    fn find(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = PicitoResult<Option<Membership>>> + Send;

    /// Owner memberships of `organization_id`, not counting `excluding`.
    fn count_owners(
        &self,
        organization_id: Uuid,
        excluding: Option<Uuid>,
    ) -> impl Future<Output = PicitoResult<u64>> + Send;

    /// Conditional role write. Applies only while the stored role is
    /// still `expected` and, when an owner is being demoted, another
    /// owner of the same organization exists at write time. Concurrent
    /// owner-dropping writes for one organization are serialized by the
    /// store, so at most one of two racing demotions of the last two
    /// owners succeeds.
    ///
    /// Fails with `NotFound`, `ConcurrentModification` (role changed
    /// underneath or a racing write committed first) or
    /// `LastOwnerViolation`; no write happens on failure.
    fn update_role(
        &self,
        id: Uuid,
        expected: OrgRole,
        role: OrgRole,
    ) -> impl Future<Output = PicitoResult<Membership>> + Send;

    /// Conditional delete with the same guard as [`Self::update_role`].
    fn delete(&self, id: Uuid, expected: OrgRole) -> impl Future<Output = PicitoResult<()>> + Send;

    /// Removes every membership of an organization; returns the count.
    fn delete_by_organization(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = PicitoResult<u64>> + Send;

    /// Removes memberships whose organization no longer exists.
    fn delete_orphaned(&self) -> impl Future<Output = PicitoResult<u64>> + Send;

    fn list_by_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = PicitoResult<Vec<Membership>>> + Send;

    /// Ordered by `joined_at` ascending.
    fn list_by_organization(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = PicitoResult<Vec<Membership>>> + Send;
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

pub trait ProjectRepository: Send + Sync {
    fn create(&self, input: CreateProject) -> impl Future<Output = PicitoResult<Project>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PicitoResult<Project>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateProject,
    ) -> impl Future<Output = PicitoResult<Project>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = PicitoResult<()>> + Send;
    fn delete_by_organization(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = PicitoResult<u64>> + Send;
    /// Removes projects whose organization no longer exists.
    fn delete_orphaned(&self) -> impl Future<Output = PicitoResult<u64>> + Send;
    /// Every project regardless of visibility.
    fn list_all(&self) -> impl Future<Output = PicitoResult<Vec<Project>>> + Send;
    /// Public projects plus private projects of organizations where
    /// `user_id` is a member. `None` yields public projects only.
    fn list_visible(
        &self,
        user_id: Option<Uuid>,
    ) -> impl Future<Output = PicitoResult<Vec<Project>>> + Send;
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

pub trait SettingRepository: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = PicitoResult<Setting>> + Send;
    fn list(&self) -> impl Future<Output = PicitoResult<Vec<Setting>>> + Send;
    /// Create (`expected_revision: None`) or compare-and-swap replace.
    fn put(&self, input: PutSetting) -> impl Future<Output = PicitoResult<Setting>> + Send;
}
