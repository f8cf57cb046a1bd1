//! Fixed-size Redis connection pool
//!
//! Opens `size` connection managers at startup and hands them out
//! round-robin. Each manager is multiplexed and reconnects on its own, so
//! checkout never waits and the pool never grows or shrinks.

use redis::aio::ConnectionManager;
use redis::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};
use uniques_common::StorageError;

pub struct ConnectionPool {
    connections: Vec<ConnectionManager>,
    next: AtomicUsize,
}

impl ConnectionPool {
    /// Open `size` connections to the server behind `client`
    pub async fn connect(client: &Client, size: usize) -> Result<Self, StorageError> {
        if size == 0 {
            return Err(StorageError::Connection(
                "Connection pool size must be at least 1".to_string(),
            ));
        }

        let mut connections = Vec::with_capacity(size);
        for slot in 0..size {
            let conn = ConnectionManager::new(client.clone())
                .await
                .map_err(|e| StorageError::Connection(format!("Failed to connect to Redis: {}", e)))?;
            debug!(slot, "Opened pooled connection");
            connections.push(conn);
        }

        info!(size, "Redis connection pool ready");
        Ok(Self {
            connections,
            next: AtomicUsize::new(0),
        })
    }

    /// Next connection in round-robin order
    pub fn get(&self) -> ConnectionManager {
        let slot = self.next.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        self.connections[slot].clone()
    }

    pub fn size(&self) -> usize {
        self.connections.len()
    }
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("size", &self.connections.len())
            .finish()
    }
}
