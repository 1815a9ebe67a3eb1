//! SurrealDB repository implementations.

mod membership;
mod organization;
mod project;
mod setting;
mod user;

pub use membership::SurrealMembershipRepository;
pub use organization::SurrealOrganizationRepository;
pub use project::SurrealProjectRepository;
pub use setting::SurrealSettingRepository;
pub use user::SurrealUserRepository;

use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_uuid(entity: &str, raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("invalid {entity} UUID {raw:?}: {e}")))
}
