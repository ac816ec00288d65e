//! # configs
//!
//! Layered settings for the Idea Hub binaries:
//! built-in defaults, then `config/idea-hub.toml` (optional), then
//! environment variables such as `IDEAHUB__DATABASE__URL` or
//! `IDEAHUB__SERVER__PORT`. A `.env` file is loaded first when present.

use std::path::PathBuf;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

pub const ENV_PREFIX: &str = "IDEAHUB";
pub const CONFIG_FILE: &str = "config/idea-hub";
const DEV_SECRET: &str = "idea-hub-development-secret-change-me";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub storage: StorageSettings,
    pub auth: AuthSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// sqlx connection URL, e.g. `sqlite:idea_hub.db` or `sqlite::memory:`
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct StorageSettings {
    /// Directory uploaded idea images are written to
    pub root: PathBuf,
    /// Prefix the images are served under
    pub url_prefix: String,
    pub max_image_bytes: usize,
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    /// Key used to sign and verify bearer tokens
    pub secret: SecretString,
}

#[derive(Debug, Deserialize)]
pub struct LogSettings {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Fallback filter when `RUST_LOG` is unset
    pub filter: String,
}

impl Settings {
    /// Loads `.env`, the optional config file and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let builder = defaults()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );
        Self::finish(builder)
    }

    /// Defaults overlaid with a TOML document, without touching the
    /// environment.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        Self::finish(defaults()?.add_source(File::from_str(toml, FileFormat::Toml)))
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// True while `auth.secret` is still the built-in development value.
    pub fn uses_development_secret(&self) -> bool {
        self.auth.secret.expose_secret() == DEV_SECRET
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let secret = self.auth.secret.expose_secret();
        if secret.trim().is_empty() {
            return Err(ConfigError::Invalid("auth.secret must not be empty".into()));
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid("database.url must not be empty".into()));
        }
        if self.storage.max_image_bytes == 0 {
            return Err(ConfigError::Invalid("storage.max_image_bytes must be positive".into()));
        }
        Ok(())
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080_i64)?
        .set_default("database.url", "sqlite:idea_hub.db")?
        .set_default("database.max_connections", 8_i64)?
        .set_default("storage.root", "./data/uploads")?
        .set_default("storage.url_prefix", "/static/uploads")?
        .set_default("storage.max_image_bytes", 5_i64 * 1024 * 1024)?
        .set_default("auth.secret", DEV_SECRET)?
        .set_default("log.json", false)?
        .set_default("log.filter", "info")?)
}
