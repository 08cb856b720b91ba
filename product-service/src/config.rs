use config::{Environment, File};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::path::Path;

use crate::error::AppError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://products.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub secret_key: String,
}

pub const DEV_SECRET_KEY: &str = "sup3r-s3cr3t";

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: DEV_SECRET_KEY.to_string(),
        }
    }
}

impl AuthConfig {
    pub fn uses_dev_secret(&self) -> bool {
        self.secret_key == DEV_SECRET_KEY
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// 默认值 < `$CONFIG_PATH/default.*` < `APP__*` < `DATABASE_URI` 等历史变量 < `VCAP_SERVICES`
    pub fn load() -> Result<Self, AppError> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config".to_string());

        let builder = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(File::from(Path::new(&config_path).join("default")).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .set_override_option("database.url", env::var("DATABASE_URI").ok())?
            .set_override_option("auth.secret_key", env::var("SECRET_KEY").ok())?
            .set_override_option("logging.level", env::var("LOG_LEVEL").ok())?
            .set_override_option("server.port", env::var("PORT").ok())?
            .set_override_option(
                "database.url",
                env::var("VCAP_SERVICES")
                    .ok()
                    .and_then(|raw| vcap_database_url(&raw)),
            )?;

        let config = builder.build()?;
        let config: Config = config.try_deserialize()?;

        Ok(config)
    }
}

/// Cloud Foundry 绑定的用户服务: `user-provided[0].credentials.url`
pub fn vcap_database_url(raw: &str) -> Option<String> {
    let vcap: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Ignoring unparseable VCAP_SERVICES: {}", e);
            return None;
        }
    };

    vcap["user-provided"][0]["credentials"]["url"]
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_sqlite() {
        let config = Config::default();
        assert_eq!(config.database.url, "sqlite://products.db?mode=rwc");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn defaults_survive_a_round_trip_through_the_builder() {
        let built = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default()).unwrap())
            .set_override_option("database.url", Some("sqlite::memory:"))
            .unwrap()
            .build()
            .unwrap();
        let config: Config = built.try_deserialize().unwrap();

        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.auth.secret_key, "sup3r-s3cr3t");
    }

    #[test]
    fn vcap_user_provided_url_is_extracted() {
        let raw = r#"{"user-provided":[{"name":"db","credentials":{"url":"sqlite://cf.db?mode=rwc"}}]}"#;
        assert_eq!(
            vcap_database_url(raw).as_deref(),
            Some("sqlite://cf.db?mode=rwc")
        );
    }

    #[test]
    fn vcap_without_a_url_is_ignored() {
        assert_eq!(vcap_database_url("not json"), None);
        assert_eq!(vcap_database_url("{}"), None);
        assert_eq!(vcap_database_url(r#"{"user-provided":[]}"#), None);
        assert_eq!(
            vcap_database_url(r#"{"user-provided":[{"credentials":{"url":42}}]}"#),
            None
        );
    }

    #[test]
    fn dev_secret_is_detected() {
        let mut auth = AuthConfig::default();
        assert!(auth.uses_dev_secret());

        auth.secret_key = "rotated".to_string();
        assert!(!auth.uses_dev_secret());
    }
}
