//! Redis counting store
//!
//! Layout:
//!
//! - `{prefix}:day:{YYYYMMDD}`: set of canonical client ids seen that day.
//!   `SADD` gives the `(client, day)` uniqueness constraint.
//! - `{prefix}:days`: sorted set of populated days scored by day ordinal.
//!   This is the range index; a window count asks it for the days in range
//!   and unions only those sets, so sparse or wide windows stay cheap.
//!
//! The window script derives day keys from the prefix, so the store expects
//! a standalone server (or a single cluster slot).

use async_trait::async_trait;
use redis::{
    Client, ConnectionAddr, ConnectionInfo, IntoConnectionInfo, RedisConnectionInfo, RedisError,
    RedisResult,
};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use uniques_common::{ClientId, Day, DayWindow, StorageError};

use crate::deadline::Deadline;
use crate::pool::ConnectionPool;
use crate::scripts::PreparedScripts;
use crate::store::CountingStore;

/// Connection and layout settings for [`RedisCountingStore`]
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    /// Full connection URL; when set, host/port/credentials are ignored
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Logical database index
    pub database: i64,
    /// Fixed number of pooled connections
    pub max_connections: usize,
    /// Prefix for every key this store writes
    pub key_prefix: String,
    /// TTL refreshed on a day set at each insert; `None` keeps data forever
    pub retention: Option<Duration>,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "127.0.0.1".to_string(),
            port: 6379,
            username: None,
            password: None,
            database: 0,
            max_connections: crate::DEFAULT_MAX_CONNECTIONS,
            key_prefix: crate::DEFAULT_KEY_PREFIX.to_string(),
            retention: None,
        }
    }
}

impl RedisStoreConfig {
    /// Connection target; a configured URL wins over the discrete fields
    pub fn connection_info(&self) -> RedisResult<ConnectionInfo> {
        match &self.url {
            Some(url) => url.as_str().into_connection_info(),
            None => Ok(ConnectionInfo {
                addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
                redis: RedisConnectionInfo {
                    db: self.database,
                    username: self.username.clone(),
                    password: self.password.clone(),
                    ..Default::default()
                },
            }),
        }
    }

    /// Connection target with the password masked, for logs
    pub fn redacted_url(&self) -> String {
        match &self.url {
            Some(_) => "<configured url>".to_string(),
            None => {
                let user = self.username.as_deref().unwrap_or("");
                let auth = if self.password.is_some() {
                    format!("{}:***@", user)
                } else if !user.is_empty() {
                    format!("{}@", user)
                } else {
                    String::new()
                };
                format!("redis://{}{}:{}/{}", auth, self.host, self.port, self.database)
            }
        }
    }
}

/// Map a Redis failure onto the store error taxonomy
pub fn storage_error(err: RedisError) -> StorageError {
    if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout() {
        StorageError::Connection(err.to_string())
    } else {
        StorageError::Backend(err.to_string())
    }
}

/// Common prefix of every day set key
pub fn day_key_prefix(prefix: &str) -> String {
    format!("{}:day:", prefix)
}

/// Day set key
pub fn day_key(prefix: &str, day: Day) -> String {
    format!("{}{}", day_key_prefix(prefix), day)
}

/// Sorted-set index of populated days
pub fn days_index_key(prefix: &str) -> String {
    format!("{}:days", prefix)
}

/// Redis-backed counting store
#[derive(Debug)]
pub struct RedisCountingStore {
    pool: ConnectionPool,
    scripts: PreparedScripts,
    key_prefix: String,
    /// 0 disables expiry
    ttl_secs: u64,
}

impl RedisCountingStore {
    /// Open the pool and load the scripts
    ///
    /// Any failure here is a startup failure: nothing is retried.
    pub async fn connect(config: &RedisStoreConfig) -> Result<Self, StorageError> {
        info!(url = %config.redacted_url(), max_connections = config.max_connections, "Connecting to Redis");

        let info = config
            .connection_info()
            .map_err(|e| StorageError::Connection(format!("Invalid Redis connection settings: {}", e)))?;
        let client = Client::open(info)
            .map_err(|e| StorageError::Connection(format!("Invalid Redis connection settings: {}", e)))?;

        let pool = ConnectionPool::connect(&client, config.max_connections).await?;

        let scripts = PreparedScripts::new();
        let mut conn = pool.get();
        scripts.load(&mut conn).await?;

        let ttl_secs = config.retention.map(|r| r.as_secs()).unwrap_or(0);
        info!(prefix = %config.key_prefix, ttl_secs, "Redis counting store ready");

        Ok(Self {
            pool,
            scripts,
            key_prefix: config.key_prefix.clone(),
            ttl_secs,
        })
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    pub fn pool_size(&self) -> usize {
        self.pool.size()
    }

    fn day_key(&self, day: Day) -> String {
        day_key(&self.key_prefix, day)
    }

    fn days_index_key(&self) -> String {
        days_index_key(&self.key_prefix)
    }
}

#[async_trait]
impl CountingStore for RedisCountingStore {
    #[instrument(skip(self, deadline))]
    async fn insert(
        &self,
        client_id: ClientId,
        day: Day,
        deadline: Deadline,
    ) -> Result<(), StorageError> {
        let key = self.day_key(day);
        let mut conn = self.pool.get();

        let added: i64 = deadline
            .run(async {
                self.scripts
                    .insert
                    .key(&key)
                    .key(self.days_index_key())
                    .arg(client_id.to_string())
                    .arg(self.ttl_secs)
                    .arg(day.ordinal())
                    .arg(day.to_string())
                    .invoke_async(&mut conn)
                    .await
                    .map_err(storage_error)
            })
            .await
            .map_err(|e| {
                warn!(key = %key, error = %e, "Insert failed");
                e
            })?;

        debug!(key = %key, added = added == 1, "Recorded client");
        Ok(())
    }

    #[instrument(skip(self, deadline))]
    async fn count_distinct_on_day(&self, day: Day, deadline: Deadline) -> Result<u64, StorageError> {
        let key = self.day_key(day);
        let mut conn = self.pool.get();

        let count: u64 = deadline
            .run(async {
                self.scripts
                    .count_day
                    .key(&key)
                    .invoke_async(&mut conn)
                    .await
                    .map_err(storage_error)
            })
            .await?;

        debug!(key = %key, count, "Counted day");
        Ok(count)
    }

    #[instrument(skip(self, deadline))]
    async fn count_distinct_in_window(
        &self,
        window: DayWindow,
        deadline: Deadline,
    ) -> Result<u64, StorageError> {
        if window.is_empty() {
            return Ok(0);
        }

        let mut conn = self.pool.get();

        let count: u64 = deadline
            .run(async {
                self.scripts
                    .count_window
                    .key(self.days_index_key())
                    .arg(day_key_prefix(&self.key_prefix))
                    .arg(window.start.ordinal())
                    .arg(window.end.ordinal())
                    .invoke_async(&mut conn)
                    .await
                    .map_err(storage_error)
            })
            .await?;

        debug!(start = %window.start, end = %window.end, count, "Counted window");
        Ok(count)
    }

    async fn ping(&self, deadline: Deadline) -> Result<(), StorageError> {
        let mut conn = self.pool.get();
        let _: String = deadline
            .run(async {
                redis::cmd("PING")
                    .query_async(&mut conn)
                    .await
                    .map_err(storage_error)
            })
            .await?;
        Ok(())
    }
}
