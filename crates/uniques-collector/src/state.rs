//! Shared handler state

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use uniques_common::StorageError;
use uniques_store::{CountingStore, Deadline, InMemoryCountingStore, RedisCountingStore};

use crate::config::{StoreBackend, StoreSettings};

/// State injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CountingStore>,
    /// Per-request store deadline
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(store: Arc<dyn CountingStore>, request_timeout: Duration) -> Self {
        Self {
            store,
            request_timeout,
        }
    }

    /// Deadline for a store call made on behalf of the current request
    pub fn deadline(&self) -> Deadline {
        Deadline::after(self.request_timeout)
    }
}

/// Build the configured counting store
///
/// Connection and script-load failures are returned to the caller, which
/// treats them as fatal.
pub async fn build_store(settings: &StoreSettings) -> Result<Arc<dyn CountingStore>, StorageError> {
    match settings.backend {
        StoreBackend::Redis => {
            let store = RedisCountingStore::connect(&settings.redis_config()).await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            info!("Using in-memory counting store; data is lost on restart");
            Ok(Arc::new(InMemoryCountingStore::new()))
        }
    }
}
