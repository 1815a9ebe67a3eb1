//! Picito Org — organization, membership, project, settings and user
//! administration services.
//!
//! Services are generic over the repository traits in `picito-core`
//! and take the acting [`picito_core::models::identity::Identity`]
//! explicitly; authorization happens here, not in the HTTP layer.

mod access;
pub mod admin;
pub mod locks;
pub mod membership;
pub mod organization;
pub mod project;
pub mod settings;

pub use admin::AdminService;
pub use locks::OrgLocks;
pub use membership::{MemberEntry, MembershipService};
pub use organization::{NewOrganization, OrganizationService, ReconcileReport};
pub use project::{NewProject, ProjectService};
pub use settings::SettingsService;
