//! Application configuration.
//!
//! Settings are read from `config/config.toml` (optional), then from
//! environment variables prefixed with `TABLELENS__` (e.g.
//! `TABLELENS__SERVER__HOST_PORT`), and finally `DATABASE_URL` overrides the
//! database URL when set.

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;

const CONFIG_FILE: &str = "config/config.toml";
const ENV_PREFIX: &str = "TABLELENS";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DatabaseConfig {
    /// Connection string; there is no built-in default database.
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host_port")]
    pub host_port: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileConfig {
    #[serde(default = "default_buckets")]
    pub default_buckets: i32,
    #[serde(default = "default_preview_limit")]
    pub default_preview_limit: i64,
    #[serde(default = "default_max_preview_limit")]
    pub max_preview_limit: i64,
}

fn default_host_port() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_buckets() -> i32 {
    20
}

fn default_preview_limit() -> i64 {
    10
}

fn default_max_preview_limit() -> i64 {
    1000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host_port: default_host_port(),
        }
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            default_buckets: default_buckets(),
            default_preview_limit: default_preview_limit(),
            max_preview_limit: default_max_preview_limit(),
        }
    }
}

impl AppConfig {
    /// Load the configuration from `config/config.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                // An unreadable file should not hide the environment settings.
                if Path::new(CONFIG_FILE).exists() {
                    log::warn!("failed to load {CONFIG_FILE}, falling back to env: {err}");
                }
                Config::builder()
                    .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load configuration from file and env: {err}, then env-only error: {env_err}"
                        ))
                    })?
            }
        };

        let mut app: AppConfig = settings.try_deserialize()?;
        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.is_empty() {
                app.database.url = Some(url);
            }
        }
        app.validate()?;
        Ok(app)
    }

    /// Parse a configuration from TOML text, without touching the environment.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let app: AppConfig = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// The configured database URL, or an error naming how to set it.
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        match self.database.url.as_deref() {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(ConfigError::NotFound(
                "DATABASE_URL is not set (or database.url in config/config.toml)".to_string(),
            )),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.profile;
        if !(1..=1000).contains(&p.default_buckets) {
            return Err(ConfigError::Message(format!(
                "profile.default_buckets must be within 1..=1000, got {}",
                p.default_buckets
            )));
        }
        if p.max_preview_limit < 0 || p.default_preview_limit < 0 {
            return Err(ConfigError::Message(
                "profile preview limits must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}
