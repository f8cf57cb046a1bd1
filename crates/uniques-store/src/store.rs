//! Counting store capability

use async_trait::async_trait;
use uniques_common::{ClientId, Day, DayWindow, StorageError};

use crate::deadline::Deadline;

/// Trait for counting store backends
///
/// Implementations must be safe under any number of concurrent callers. Two
/// concurrent inserts of the same pair both succeed and leave one record. A
/// count never observes a half-applied insert.
#[async_trait]
pub trait CountingStore: Send + Sync {
    /// Record that `client_id` was seen on `day`; repeating a pair is a no-op
    async fn insert(
        &self,
        client_id: ClientId,
        day: Day,
        deadline: Deadline,
    ) -> Result<(), StorageError>;

    /// Distinct clients seen on `day` (0 when nothing was recorded)
    async fn count_distinct_on_day(&self, day: Day, deadline: Deadline) -> Result<u64, StorageError>;

    /// Distinct clients seen on any day in the inclusive window
    async fn count_distinct_in_window(
        &self,
        window: DayWindow,
        deadline: Deadline,
    ) -> Result<u64, StorageError>;

    /// Check that the backend is reachable
    async fn ping(&self, deadline: Deadline) -> Result<(), StorageError>;
}
