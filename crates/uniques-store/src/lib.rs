//! # Uniques Store
//!
//! Deduplicating storage of `(client, day)` pairs and distinct-client
//! aggregation.
//!
//! ## Backends
//!
//! - [`RedisCountingStore`]: one Redis set per day, prepared Lua scripts and
//!   a fixed pool of connection managers
//! - [`InMemoryCountingStore`]: DashMap of per-day sets, used for local runs
//!   and as the test double
//!
//! Both implement [`CountingStore`]. Insert is set-union, so repeating a
//! pair is a no-op, and window counts union clients across days so a client
//! seen on several days counts once.

pub mod deadline;
pub mod memory;
pub mod pool;
pub mod redis_store;
pub mod scripts;
pub mod store;

pub use deadline::Deadline;
pub use memory::InMemoryCountingStore;
pub use pool::ConnectionPool;
pub use redis_store::{RedisCountingStore, RedisStoreConfig};
pub use store::CountingStore;

/// Default Redis key prefix
pub const DEFAULT_KEY_PREFIX: &str = "uniques";

/// Default number of pooled Redis connections
pub const DEFAULT_MAX_CONNECTIONS: usize = 16;
