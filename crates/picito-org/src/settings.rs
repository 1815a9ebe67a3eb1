//! Versioned settings, one entry per key.

use picito_core::error::PicitoResult;
use picito_core::models::identity::Identity;
use picito_core::models::setting::{PutSetting, Setting};
use picito_core::permission::GlobalAction;
use picito_core::repository::SettingRepository;
use picito_core::validation;
use tracing::info;

use crate::access::require_global;

pub struct SettingsService<S: SettingRepository> {
    settings: S,
}

impl<S: SettingRepository> SettingsService<S> {
    pub fn new(settings: S) -> Self {
        Self { settings }
    }

    /// Reads a single setting. Public.
    pub async fn get(&self, key: &str) -> PicitoResult<Setting> {
        let key = validation::setting_key(key)?;
        self.settings.get(&key).await
    }

    pub async fn list(&self, actor: &Identity) -> PicitoResult<Vec<Setting>> {
        require_global(actor, GlobalAction::ManageSettings)?;
        self.settings.list().await
    }

    /// Creates `key` when `expected_revision` is `None`, otherwise
    /// replaces it only if its revision still matches.
    pub async fn put(
        &self,
        actor: &Identity,
        key: &str,
        value: serde_json::Value,
        expected_revision: Option<u64>,
    ) -> PicitoResult<Setting> {
        require_global(actor, GlobalAction::ManageSettings)?;
        let key = validation::setting_key(key)?;

        let setting = self
            .settings
            .put(PutSetting {
                key,
                value,
                expected_revision,
                updated_by: Some(actor.user_id),
            })
            .await?;

        info!(key = %setting.key, revision = setting.revision, actor = %actor.user_id, "Setting written");
        Ok(setting)
    }
}
