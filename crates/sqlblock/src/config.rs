//! Connection pool configuration, loaded from JSON or TOML.
//!
//! ```
//! use sqlblock::PoolConfig;
//!
//! let config = PoolConfig::from_json_str(
//!     r#"{ "jdbcUrl": "postgres://localhost/app", "username": "app", "max_pool_size": 4 }"#,
//! )
//! .unwrap();
//! assert_eq!(config.url, "postgres://localhost/app");
//! assert_eq!(config.max_pool_size, 4);
//! assert_eq!(config.initial_pool_size, 3);
//! ```

use crate::error::{DbError, DbResult};
use serde::Deserialize;
use std::time::Duration;

fn default_max_pool_size() -> usize {
    15
}

fn default_initial_pool_size() -> usize {
    3
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PoolConfig {
    /// Connection URL. A `jdbc:` prefix is accepted and ignored.
    #[serde(alias = "jdbcUrl")]
    pub url: String,
    /// Overrides the user embedded in `url`.
    #[serde(default)]
    pub username: Option<String>,
    /// Overrides the password embedded in `url`.
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_max_pool_size", alias = "maxPoolSize")]
    pub max_pool_size: usize,
    /// Connections opened eagerly by [`connect`](crate::pool::connect).
    #[serde(default = "default_initial_pool_size", alias = "initialPoolSize")]
    pub initial_pool_size: usize,
    /// Idle connections older than this many milliseconds are evicted.
    #[serde(default, alias = "maxIdleTime")]
    pub max_idle_time: Option<u64>,
    /// Connect timeout in milliseconds.
    #[serde(default, alias = "connectTimeout")]
    pub connect_timeout: Option<u64>,
}

impl PoolConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
            max_pool_size: default_max_pool_size(),
            initial_pool_size: default_initial_pool_size(),
            max_idle_time: None,
            connect_timeout: None,
        }
    }

    pub fn from_json_str(raw: &str) -> DbResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()
    }

    pub fn from_toml_str(raw: &str) -> DbResult<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()
    }

    /// Read a JSON (`.json`) or TOML (anything else) file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DbError::Config(format!("failed to read {}: {e}", path.display())))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&raw),
            _ => Self::from_toml_str(&raw),
        }
    }

    /// Build from the `DATABASE_URL` environment variable (a `.env` file is honored).
    pub fn from_env() -> DbResult<Self> {
        let _ = dotenvy::dotenv();
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| DbError::Config("DATABASE_URL is not set".to_string()))?;
        Self::new(url).validate()
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn max_pool_size(mut self, size: usize) -> Self {
        self.max_pool_size = size;
        self
    }

    pub fn initial_pool_size(mut self, size: usize) -> Self {
        self.initial_pool_size = size;
        self
    }

    fn validate(self) -> DbResult<Self> {
        if self.url.trim().is_empty() {
            return Err(DbError::Config("url must not be empty".to_string()));
        }
        if self.max_pool_size == 0 {
            return Err(DbError::Config("max_pool_size must be at least 1".to_string()));
        }
        Ok(self)
    }

    /// The URL without a `jdbc:` prefix.
    pub fn connection_url(&self) -> &str {
        let url = self.url.trim();
        url.strip_prefix("jdbc:").unwrap_or(url)
    }

    pub fn max_idle(&self) -> Option<Duration> {
        self.max_idle_time.map(Duration::from_millis)
    }

    pub fn connect_timeout_duration(&self) -> Option<Duration> {
        self.connect_timeout.map(Duration::from_millis)
    }

    /// Parsed driver configuration with credential overrides applied.
    pub fn pg_config(&self) -> DbResult<tokio_postgres::Config> {
        let mut config: tokio_postgres::Config = self
            .connection_url()
            .parse()
            .map_err(|e: tokio_postgres::Error| DbError::Connection(e.to_string()))?;
        if let Some(user) = &self.username {
            config.user(user);
        }
        if let Some(password) = &self.password {
            config.password(password);
        }
        if let Some(timeout) = self.connect_timeout_duration() {
            config.connect_timeout(timeout);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_defaults() {
        let config = PoolConfig::from_json_str(r#"{ "url": "postgres://localhost/app" }"#).unwrap();
        assert_eq!(config, PoolConfig::new("postgres://localhost/app"));
    }

    #[test]
    fn test_toml() {
        let raw = r#"
            url = "jdbc:postgresql://localhost:5432/app"
            username = "app"
            password = "secret"
            max_pool_size = 20
            initial_pool_size = 5
            max_idle_time = 60000
            connect_timeout = 3000
        "#;
        let config = PoolConfig::from_toml_str(raw).unwrap();
        assert_eq!(config.connection_url(), "postgresql://localhost:5432/app");
        assert_eq!(config.max_pool_size, 20);
        assert_eq!(config.initial_pool_size, 5);
        assert_eq!(config.max_idle(), Some(Duration::from_secs(60)));

        let pg = config.pg_config().unwrap();
        assert_eq!(pg.get_user(), Some("app"));
        assert_eq!(pg.get_connect_timeout(), Some(&Duration::from_secs(3)));
    }

    #[test]
    fn test_camel_case_aliases() {
        let config = PoolConfig::from_json_str(
            r#"{ "jdbcUrl": "postgres://h/db", "maxPoolSize": 2, "maxIdleTime": 10 }"#,
        )
        .unwrap();
        assert_eq!(config.max_pool_size, 2);
        assert_eq!(config.max_idle_time, Some(10));
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            PoolConfig::from_json_str(r#"{ "url": "" }"#),
            Err(DbError::Config(_))
        ));
        assert!(matches!(
            PoolConfig::from_json_str(r#"{ "url": "postgres://h/db", "max_pool_size": 0 }"#),
            Err(DbError::Config(_))
        ));
        assert!(matches!(PoolConfig::from_toml_str("url = 1"), Err(DbError::Config(_))));
    }
}
