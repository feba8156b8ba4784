//! Configuration module
//!
//! Settings come from an optional TOML file and are then overridden by
//! environment variables. The resulting [`AppConfig`] is built once at
//! startup and handed to the server; nothing reads the environment later.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::crypto::password::DEFAULT_PASSWORD_COST;
use crate::infrastructure::DatabaseConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("environment variable {key} has invalid value {value:?}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Default config location: `<config_dir>/usuarios-service/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("usuarios-service")
        .join("config.toml")
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub security: SecuritySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            shutdown_timeout: 30,
        }
    }
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Full connection URL; takes precedence over the individual parts
    pub url: Option<String>,
    pub user: String,
    pub password: String,
    pub host: String,
    pub name: String,
    pub port: u16,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            user: "postgres".to_string(),
            password: String::new(),
            host: "localhost".to_string(),
            name: "postgres".to_string(),
            port: 5432,
            max_connections: 10,
        }
    }
}

impl DatabaseSettings {
    pub fn connection_url(&self) -> String {
        if let Some(url) = self.url.as_deref().filter(|u| !u.is_empty()) {
            return url.to_string();
        }
        let credentials = if self.password.is_empty() {
            self.user.clone()
        } else {
            format!("{}:{}", self.user, self.password)
        };
        format!(
            "postgres://{}@{}:{}/{}",
            credentials, self.host, self.port, self.name
        )
    }

    pub fn to_database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.connection_url(),
            max_connections: self.max_connections,
        }
    }
}

impl std::fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("url", &self.url.as_ref().map(|_| "<set>"))
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    pub jwt_secret: String,
    /// Token lifetime in hours; 0 (the default) issues tokens that never expire
    pub jwt_expiration_hours: i64,
    pub bcrypt_cost: u32,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_expiration_hours: 0,
            bcrypt_cost: DEFAULT_PASSWORD_COST,
        }
    }
}

impl SecuritySettings {
    pub fn jwt_config(&self) -> JwtConfig {
        let expiration = (self.jwt_expiration_hours > 0).then_some(self.jwt_expiration_hours);
        JwtConfig::new(self.jwt_secret.clone(), expiration)
    }
}

impl std::fmt::Debug for SecuritySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecuritySettings")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    /// "text" or "json"
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl AppConfig {
    /// Read the TOML file (if present), apply environment overrides and
    /// validate the result.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse the TOML file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Apply overrides from a key lookup (the process environment in
    /// production, a map in tests).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = parse_env("PORT", v)?;
        }

        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Some(v) = lookup("PG_USER") {
            self.database.user = v;
        }
        if let Some(v) = lookup("PG_PASSWORD") {
            self.database.password = v;
        }
        if let Some(v) = lookup("PG_HOST") {
            self.database.host = v;
        }
        if let Some(v) = lookup("PG_DATABASE") {
            self.database.name = v;
        }
        if let Some(v) = lookup("PG_PORT") {
            self.database.port = parse_env("PG_PORT", v)?;
        }
        if let Some(v) = lookup("PG_MAX_CONNECTIONS") {
            self.database.max_connections = parse_env("PG_MAX_CONNECTIONS", v)?;
        }

        if let Some(v) = lookup("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = lookup("JWT_EXPIRATION_HOURS") {
            self.security.jwt_expiration_hours = parse_env("JWT_EXPIRATION_HOURS", v)?;
        }
        if let Some(v) = lookup("BCRYPT_COST") {
            self.security.bcrypt_cost = parse_env("BCRYPT_COST", v)?;
        }

        if let Some(v) = lookup("LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = lookup("LOG_FORMAT") {
            self.logging.format = v;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Invalid(
                "security.jwt_secret (JWT_SECRET) must be set".into(),
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be non-zero".into()));
        }
        if !(4..=31).contains(&self.security.bcrypt_cost) {
            return Err(ConfigError::Invalid(format!(
                "security.bcrypt_cost must be within 4..=31, got {}",
                self.security.bcrypt_cost
            )));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { key, value })
}
