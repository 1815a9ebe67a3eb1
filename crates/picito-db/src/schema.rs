//! Picito schema and its migration runner.
//!
//! Tables are SCHEMAFULL. UUIDs are stored as strings and enums as
//! lowercase strings guarded by ASSERT. Uniqueness that the domain
//! relies on (user email, organization slug, one membership per user
//! and organization, setting key) is enforced by UNIQUE indexes.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}


struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial_schema",
        sql: SCHEMA_V1,
    },
    Migration {
        version: 2,
        name: "owner_guard",
        sql: SCHEMA_V2,
    },
];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users (global scope)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['admin', 'user'];
DEFINE FIELD last_login_at ON TABLE user TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user \
    COLUMNS email UNIQUE;

-- =======================================================================
-- Organizations (global scope)
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD name ON TABLE organization TYPE string;
DEFINE FIELD slug ON TABLE organization TYPE string;
DEFINE FIELD description ON TABLE organization TYPE string \
    DEFAULT '';
DEFINE FIELD created_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_organization_slug ON TABLE organization \
    COLUMNS slug UNIQUE;

-- =======================================================================
-- Memberships (organization scope)
-- =======================================================================
DEFINE TABLE membership SCHEMAFULL;
DEFINE FIELD user_id ON TABLE membership TYPE string;
DEFINE FIELD organization_id ON TABLE membership TYPE string;
DEFINE FIELD role ON TABLE membership TYPE string \
    ASSERT $value IN ['owner', 'admin', 'member'];
DEFINE FIELD joined_at ON TABLE membership TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_membership_user_org ON TABLE membership \
    COLUMNS user_id, organization_id UNIQUE;
DEFINE INDEX idx_membership_org_role ON TABLE membership \
    COLUMNS organization_id, role;

-- =======================================================================
-- Projects (organization scope)
-- =======================================================================
DEFINE TABLE project SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE project TYPE string;
DEFINE FIELD name ON TABLE project TYPE string;
DEFINE FIELD embed_url ON TABLE project TYPE string;
DEFINE FIELD version ON TABLE project TYPE string;
DEFINE FIELD visibility ON TABLE project TYPE string \
    ASSERT $value IN ['public', 'private'];
DEFINE FIELD created_at ON TABLE project TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE project TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_project_org ON TABLE project \
    COLUMNS organization_id;
DEFINE INDEX idx_project_visibility ON TABLE project \
    COLUMNS visibility;

-- =======================================================================
-- Settings (global scope, one record per key)
-- =======================================================================
DEFINE TABLE setting SCHEMAFULL;
DEFINE FIELD key ON TABLE setting TYPE string;
DEFINE FIELD value ON TABLE setting TYPE any;
DEFINE FIELD revision ON TABLE setting TYPE int \
    ASSERT $value >= 1;
DEFINE FIELD updated_by ON TABLE setting TYPE option<string>;
DEFINE FIELD updated_at ON TABLE setting TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_setting_key ON TABLE setting \
    COLUMNS key UNIQUE;
";

// -----------------------------------------------------------------------
// Schema v2: per-organization owner guard
// -----------------------------------------------------------------------

// One record per organization, keyed by the organization UUID. Every
// write that gives up an owner seat bumps it in the same transaction, so
// two such writes for one organization conflict at commit.
const SCHEMA_V2: &str = "\
DEFINE TABLE owner_guard SCHEMAFULL;
DEFINE FIELD version ON TABLE owner_guard TYPE int DEFAULT 0;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Highest schema version known to this build.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}

/// Reads the highest applied migration version (0 on a fresh database).
pub async fn current_version<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    let mut result = db
        .query("SELECT version, name FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    Ok(records.first().map(|m| m.version).unwrap_or(0))
}

/// Bring the database schema up to [`latest_version`].
///
/// The `_migration` table is created on first use; migrations newer
/// than the recorded version are applied in order and each one is
/// recorded immediately after it succeeds. Calling this on an
/// up-to-date database is a no-op.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let applied = current_version(db).await?;
    let pending = MIGRATIONS.iter().filter(|m| m.version > applied);

    for migration in pending {
        info!(
            version = migration.version,
            name = migration.name,
            "Applying schema migration"
        );

        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "v{} '{}' failed: {e}",
                migration.version, migration.name
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!("recording v{} failed: {e}", migration.version))
            })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_declares_unique_indexes() {
        for index in [
            "idx_user_email",
            "idx_organization_slug",
            "idx_membership_user_org",
            "idx_setting_key",
        ] {
            assert!(SCHEMA_V1.contains(index), "missing {index}");
        }
    }

    #[test]
    fn owner_guard_table_is_defined() {
        assert!(SCHEMA_V2.contains("DEFINE TABLE owner_guard"));
    }

    #[test]
    fn migrations_are_ordered() {
        assert!(MIGRATIONS.windows(2).all(|w| w[0].version < w[1].version));
        assert_eq!(latest_version(), 2);
    }
}
