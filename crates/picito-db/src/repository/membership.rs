//! SurrealDB implementation of [`MembershipRepository`].
//!
//! Role changes and removals are conditional writes: the `WHERE` clause
//! re-checks the expected role and, when an owner seat is being given
//! up, that another owner of the organization still exists. Writes that
//! give up an owner seat also bump the organization's owner guard in the
//! same transaction, which turns two racing demotions into a commit
//! conflict instead of two successful writes.

use chrono::{DateTime, Utc};
use picito_core::error::{PicitoError, PicitoResult};
use picito_core::models::membership::{CreateMembership, Membership};
use picito_core::models::role::OrgRole;
use picito_core::ownership::{MembershipChange, last_owner};
use picito_core::repository::MembershipRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_uuid};
use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct MembershipRow {
    user_id: String,
    organization_id: String,
    role: String,
    joined_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct MembershipRowWithId {
    record_id: String,
    user_id: String,
    organization_id: String,
    role: String,
    joined_at: DateTime<Utc>,
}

fn parse_role(s: &str) -> Result<OrgRole, DbError> {
    s.parse()
        .map_err(|_| DbError::Decode(format!("unknown organization role: {s}")))
}

impl MembershipRow {
    fn into_membership(self, id: Uuid) -> Result<Membership, DbError> {
        Ok(Membership {
            id,
            user_id: parse_uuid("user", &self.user_id)?,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            role: parse_role(&self.role)?,
            joined_at: self.joined_at,
        })
    }
}

impl MembershipRowWithId {
    fn try_into_membership(self) -> Result<Membership, DbError> {
        Ok(Membership {
            id: parse_uuid("membership", &self.record_id)?,
            user_id: parse_uuid("user", &self.user_id)?,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            role: parse_role(&self.role)?,
            joined_at: self.joined_at,
        })
    }
}

fn collect(rows: Vec<MembershipRowWithId>) -> Result<Vec<Membership>, DbError> {
    rows.into_iter()
        .map(MembershipRowWithId::try_into_membership)
        .collect()
}

/// Guard shared by conditional updates and deletes. `$drops_owner`
/// short-circuits the owner count for changes that keep the seat.
const OWNER_GUARD: &str = "role = $expected AND (\
     $drops_owner = false OR \
     array::len((\
         SELECT VALUE id FROM membership \
         WHERE organization_id = $organization_id \
         AND role = 'owner' \
         AND id != type::record('membership', $id)\
     )) > 0\
 )";

/// Bumps the organization's `owner_guard` record.
const BUMP_OWNER_GUARD: &str = "UPSERT type::record('owner_guard', $organization_id) \
     SET version = (version OR 0) + 1 RETURN NONE;";

/// A write that gives up an owner seat runs in one transaction with
/// [`BUMP_OWNER_GUARD`]. Two of them for the same organization write the
/// same guard record, so at most one commits even when each saw the
/// other's owner row in its snapshot.
fn guarded_write(statement: String, drops_owner: bool) -> String {
    if drops_owner {
        format!("BEGIN TRANSACTION; {BUMP_OWNER_GUARD} {statement}; COMMIT TRANSACTION;")
    } else {
        statement
    }
}

/// SurrealDB implementation of the Membership repository.
#[derive(Clone)]
pub struct SurrealMembershipRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealMembershipRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

/// Explains why a guarded write left `stored` unchanged.
fn rejected(stored: &Membership, expected: OrgRole) -> PicitoError {
    if stored.role != expected {
        PicitoError::ConcurrentModification {
            entity: "membership".into(),
        }
    } else {
        last_owner(stored.organization_id)
    }
}

impl<C: Connection> MembershipRepository for SurrealMembershipRepository<C> {
    async fn create(&self, input: CreateMembership) -> PicitoResult<Membership> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('membership', $id) SET \
                 user_id = $user_id, organization_id = $organization_id, \
                 role = $role",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("role", input.role.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("membership", e))?;

        let rows: Vec<MembershipRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("membership", id_str))?;

        Ok(row.into_membership(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> PicitoResult<Membership> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('membership', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("membership", id_str))?;

        Ok(row.into_membership(id)?)
    }

    async fn find(&self, organization_id: Uuid, user_id: Uuid) -> PicitoResult<Option<Membership>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM membership \
                 WHERE organization_id = $organization_id AND user_id = $user_id",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(collect(rows)?.into_iter().next())
    }

    async fn count_owners(&self, organization_id: Uuid, excluding: Option<Uuid>) -> PicitoResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM membership \
                 WHERE organization_id = $organization_id \
                 AND role = 'owner' \
                 AND meta::id(id) != $excluding \
                 GROUP ALL",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("excluding", excluding.map(|id| id.to_string())))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn update_role(&self, id: Uuid, expected: OrgRole, role: OrgRole) -> PicitoResult<Membership> {
        // organization_id never changes, so reading it ahead of the
        // conditional write is safe.
        let current = self.get_by_id(id).await?;
        let drops_owner = MembershipChange::SetRole(role).drops_owner(expected);

        let statement = format!(
            "UPDATE type::record('membership', $id) SET role = $role \
             WHERE {OWNER_GUARD}"
        );
        self.db
            .query(guarded_write(statement, drops_owner))
            .bind(("id", id.to_string()))
            .bind(("role", role.as_str().to_string()))
            .bind(("expected", expected.as_str().to_string()))
            .bind(("drops_owner", drops_owner))
            .bind(("organization_id", current.organization_id.to_string()))
            .await
            .map_err(|e| DbError::from_statement("membership", e))?
            .check()
            .map_err(|e| DbError::from_statement("membership", e))?;

        // Whether the guarded write applied is read back from the row.
        let stored = self.get_by_id(id).await?;
        if stored.role == role {
            Ok(stored)
        } else {
            Err(rejected(&stored, expected))
        }
    }

    async fn delete(&self, id: Uuid, expected: OrgRole) -> PicitoResult<()> {
        let current = self.get_by_id(id).await?;
        let drops_owner = MembershipChange::Remove.drops_owner(expected);

        let statement = format!("DELETE type::record('membership', $id) WHERE {OWNER_GUARD}");
        self.db
            .query(guarded_write(statement, drops_owner))
            .bind(("id", id.to_string()))
            .bind(("expected", expected.as_str().to_string()))
            .bind(("drops_owner", drops_owner))
            .bind(("organization_id", current.organization_id.to_string()))
            .await
            .map_err(|e| DbError::from_statement("membership", e))?
            .check()
            .map_err(|e| DbError::from_statement("membership", e))?;

        match self.get_by_id(id).await {
            Err(PicitoError::NotFound { .. }) => Ok(()),
            Ok(stored) => Err(rejected(&stored, expected)),
            Err(err) => Err(err),
        }
    }

    async fn delete_by_organization(&self, organization_id: Uuid) -> PicitoResult<u64> {
        let mut result = self
            .db
            .query(
                "DELETE membership WHERE organization_id = $organization_id \
                 RETURN BEFORE; \
                 DELETE type::record('owner_guard', $organization_id)",
            )
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.len() as u64)
    }

    async fn delete_orphaned(&self) -> PicitoResult<u64> {
        let mut result = self
            .db
            .query(
                "DELETE membership WHERE organization_id NOT IN (\
                     SELECT VALUE meta::id(id) FROM organization\
                 ) RETURN BEFORE",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.len() as u64)
    }

    async fn list_by_user(&self, user_id: Uuid) -> PicitoResult<Vec<Membership>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM membership \
                 WHERE user_id = $user_id ORDER BY joined_at ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(collect(rows)?)
    }

    async fn list_by_organization(&self, organization_id: Uuid) -> PicitoResult<Vec<Membership>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM membership \
                 WHERE organization_id = $organization_id ORDER BY joined_at ASC",
            )
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(collect(rows)?)
    }
}
