//! Layered server configuration.
//!
//! Sources, highest priority first:
//! 1. Environment variables (`PICITO_*` prefix, `__` separates sections)
//! 2. `picito.toml` in the working directory
//! 3. Built-in defaults
//!
//! `PICITO_AUTH__JWT_SECRET` maps to `auth.jwt_secret`,
//! `PICITO_DATABASE__URL` to `database.url`, and so on.

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use picito_auth::AuthConfig;
use picito_db::DbConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONFIG_FILE: &str = "picito.toml";

/// Upper bound for `auth.session_lifetime_secs`: one year.
const MAX_SESSION_LIFETIME_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind_addr: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub database: DbConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Loads and validates configuration from defaults, `picito.toml`
    /// and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`Self::load`], reading a `.env` file first when one exists.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if Path::new(CONFIG_FILE).exists() {
            figment = figment.merge(Toml::file(CONFIG_FILE));
        }
        figment.merge(Env::prefixed("PICITO_").split("__"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "auth.jwt_secret".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.auth.session_lifetime_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "auth.session_lifetime_secs".into(),
                reason: "must be positive".into(),
            });
        }
        if self.auth.session_lifetime_secs > MAX_SESSION_LIFETIME_SECS {
            return Err(ConfigError::InvalidValue {
                field: "auth.session_lifetime_secs".into(),
                reason: format!("must not exceed {MAX_SESSION_LIFETIME_SECS}"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_without_secret_are_rejected() {
        Jail::expect_with(|_jail| {
            let err = ServerConfig::load().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { .. }));
            Ok(())
        });
    }

    #[test]
    fn session_lifetime_is_bounded() {
        Jail::expect_with(|jail| {
            jail.set_env("PICITO_AUTH__JWT_SECRET", "from-env");
            jail.set_env("PICITO_AUTH__SESSION_LIFETIME_SECS", "18446744073709551615");

            let err = ServerConfig::load().unwrap_err();
            assert!(
                matches!(&err, ConfigError::InvalidValue { field, .. } if field == "auth.session_lifetime_secs"),
                "got {err:?}"
            );
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("PICITO_AUTH__JWT_SECRET", "from-env");
            jail.set_env("PICITO_DATABASE__NAMESPACE", "staging");
            jail.set_env("PICITO_HTTP__BIND_ADDR", "127.0.0.1:8080");

            let config = ServerConfig::load().expect("config loads");
            assert_eq!(config.auth.jwt_secret, "from-env");
            assert_eq!(config.auth.cookie_name, "picito_session");
            assert_eq!(config.auth.session_lifetime_secs, 86_400);
            assert_eq!(config.database.namespace, "staging");
            assert_eq!(config.database.url, "mem://");
            assert_eq!(config.http.bind_addr, "127.0.0.1:8080");
            Ok(())
        });
    }

    #[test]
    fn toml_file_is_layered_under_environment() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "picito.toml",
                r#"
                [auth]
                jwt_secret = "from-file"
                jwt_issuer = "file-issuer"
                bootstrap_admins = ["root@example.com"]
                "#,
            )?;
            jail.set_env("PICITO_AUTH__JWT_SECRET", "from-env");

            let config = ServerConfig::load().expect("config loads");
            assert_eq!(config.auth.jwt_secret, "from-env");
            assert_eq!(config.auth.jwt_issuer, "file-issuer");
            assert_eq!(config.auth.bootstrap_admins, vec!["root@example.com"]);
            Ok(())
        });
    }
}
