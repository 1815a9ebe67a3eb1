//! SurrealDB implementation of [`SettingRepository`].
//!
//! Each key is its own record (`setting:<key>`), so writes to different
//! keys never touch the same document. Replacing a key is a
//! compare-and-swap on its `revision`.

use chrono::{DateTime, Utc};
use picito_core::error::{PicitoError, PicitoResult};
use picito_core::models::setting::{PutSetting, Setting};
use picito_core::repository::SettingRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct SettingRow {
    key: String,
    value: serde_json::Value,
    revision: u64,
    updated_by: Option<String>,
    updated_at: DateTime<Utc>,
}

impl SettingRow {
    fn try_into_setting(self) -> Result<Setting, DbError> {
        let updated_by = self
            .updated_by
            .as_deref()
            .map(|raw| parse_uuid("user", raw))
            .transpose()?;
        Ok(Setting {
            key: self.key,
            value: self.value,
            revision: self.revision,
            updated_by,
            updated_at: self.updated_at,
        })
    }
}

fn first_setting(rows: Vec<SettingRow>, key: &str) -> Result<Setting, DbError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| DbError::not_found("setting", key))?
        .try_into_setting()
}

/// SurrealDB implementation of the Setting repository.
#[derive(Clone)]
pub struct SurrealSettingRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSettingRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SettingRepository for SurrealSettingRepository<C> {
    async fn get(&self, key: &str) -> PicitoResult<Setting> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('setting', $key)")
            .bind(("key", key.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SettingRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_setting(rows, key)?)
    }

    async fn list(&self) -> PicitoResult<Vec<Setting>> {
        let mut result = self
            .db
            .query("SELECT * FROM setting ORDER BY key ASC")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SettingRow> = result.take(0).map_err(DbError::from)?;
        let settings = rows
            .into_iter()
            .map(SettingRow::try_into_setting)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(settings)
    }

    async fn put(&self, input: PutSetting) -> PicitoResult<Setting> {
        let key = input.key.clone();
        let updated_by = input.updated_by.map(|id| id.to_string());

        let query = match input.expected_revision {
            None => {
                "CREATE type::record('setting', $key) SET \
                 key = $key, value = $value, revision = 1, \
                 updated_by = $updated_by"
            }
            Some(_) => {
                "UPDATE type::record('setting', $key) SET \
                 value = $value, revision = revision + 1, \
                 updated_by = $updated_by, updated_at = time::now() \
                 WHERE revision = $expected"
            }
        };

        let result = self
            .db
            .query(query)
            .bind(("key", input.key))
            .bind(("value", input.value))
            .bind(("updated_by", updated_by))
            .bind(("expected", input.expected_revision.unwrap_or(0)))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("setting", e))?;

        let rows: Vec<SettingRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() && input.expected_revision.is_some() {
            // Either the key is gone or someone else bumped the revision.
            return Err(match self.get(&key).await {
                Ok(_) => PicitoError::ConcurrentModification {
                    entity: "setting".into(),
                },
                Err(err) => err,
            });
        }

        Ok(first_setting(rows, &key)?)
    }
}
