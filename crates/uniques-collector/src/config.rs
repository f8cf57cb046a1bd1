//! Collector configuration
//!
//! Sources, lowest priority first: defaults, optional YAML file, `.env`,
//! `UNIQUES_` environment variables (`__` between sections), then `PORT`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use uniques_common::UniquesError;
use uniques_store::RedisStoreConfig;

/// Default configuration file, read only if present
pub const DEFAULT_CONFIG_PATH: &str = "./config.yml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "UNIQUES";

/// Shortest retention that still covers a trailing-month window
pub const MIN_RETENTION_DAYS: u32 = uniques_common::MAX_MONTH_WINDOW_DAYS as u32;

/// Collector service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// HTTP listener
    pub server: ServerSettings,
    /// Counting store backend
    pub store: StoreSettings,
    /// Log output
    pub logging: LoggingSettings,
}

impl CollectorConfig {
    /// Load configuration from file and environment
    ///
    /// `path` is the `--config` flag. An explicit path must name a regular
    /// file; without one, `./config.yml` is used if it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let environment = config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__");

        let mut cfg = Self::load_from(path, environment)?;

        // Platform PORT wins over everything else
        if let Ok(port) = std::env::var("PORT") {
            cfg.server.port = port
                .parse()
                .with_context(|| format!("PORT is not a valid port: {:?}", port))?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Merge an optional file with the given environment source
    pub fn load_from(path: Option<&Path>, environment: config::Environment) -> Result<Self> {
        let file = match path {
            Some(path) => {
                validate_config_path(path)?;
                Some((path.to_path_buf(), true))
            }
            None => Some((PathBuf::from(DEFAULT_CONFIG_PATH), false)),
        };

        let mut builder = config::Config::builder();
        if let Some((path, required)) = file {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Yaml)
                    .required(required),
            );
        }

        let cfg = builder
            .add_source(environment)
            .build()
            .context("Failed to read configuration")?
            .try_deserialize::<Self>()
            .context("Invalid configuration")?;

        Ok(cfg)
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> std::result::Result<(), UniquesError> {
        let invalid = |msg: &str| -> std::result::Result<(), UniquesError> {
            Err(UniquesError::Config(msg.to_string()))
        };

        if self.server.port == 0 {
            return invalid("server.port must be non-zero");
        }
        if self.server.request_timeout_ms == 0 {
            return invalid("server.request_timeout_ms must be non-zero");
        }
        if self.store.max_connections == 0 {
            return invalid("store.max_connections must be at least 1");
        }
        if self.store.key_prefix.trim().is_empty() {
            return invalid("store.key_prefix must not be empty");
        }
        if self.store.retention_days > 0 && self.store.retention_days < MIN_RETENTION_DAYS {
            return Err(UniquesError::Config(format!(
                "store.retention_days must be 0 (keep forever) or at least {}",
                MIN_RETENTION_DAYS
            )));
        }
        Ok(())
    }

    /// Listen address as `host:port`
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Make sure an explicitly given config path can be read
fn validate_config_path(path: &Path) -> Result<()> {
    let meta = std::fs::metadata(path)
        .with_context(|| format!("Cannot read config file {}", path.display()))?;
    if meta.is_dir() {
        bail!("'{}' is a directory, not a normal file", path.display());
    }
    Ok(())
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Deadline handed to the store for each request
    pub request_timeout_ms: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_ms: crate::DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl ServerSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Which counting store to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Redis,
    /// Process-local, lost on restart
    Memory,
}

/// Counting store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub redis: RedisSettings,
    /// Fixed connection pool size
    pub max_connections: usize,
    pub key_prefix: String,
    /// Day sets expire this many days after their last insert (0 = never)
    pub retention_days: u32,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            redis: RedisSettings::default(),
            max_connections: uniques_store::DEFAULT_MAX_CONNECTIONS,
            key_prefix: uniques_store::DEFAULT_KEY_PREFIX.to_string(),
            retention_days: 0,
        }
    }
}

impl StoreSettings {
    pub fn redis_config(&self) -> RedisStoreConfig {
        RedisStoreConfig {
            url: self.redis.url.clone(),
            host: self.redis.host.clone(),
            port: self.redis.port,
            username: self.redis.username.clone(),
            password: self.redis.password.clone(),
            database: self.redis.database,
            max_connections: self.max_connections,
            key_prefix: self.key_prefix.clone(),
            retention: (self.retention_days > 0)
                .then(|| Duration::from_secs(u64::from(self.retention_days) * 86_400)),
        }
    }
}

/// Redis connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisSettings {
    /// Full URL; overrides the fields below when set
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Logical database index
    pub database: i64,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: None,
            host: "127.0.0.1".to_string(),
            port: 6379,
            username: None,
            password: None,
            database: 0,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Logging settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub format: LogFormat,
}
