//! In-memory counting store
//!
//! Uses DashMap for concurrent access. Each day's client set sits behind
//! its shard lock, so an insert is either fully visible to a reader of that
//! day or not at all.

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashSet;
use tracing::{debug, instrument};
use uniques_common::{ClientId, Day, DayWindow, StorageError};

use crate::deadline::Deadline;
use crate::store::CountingStore;

/// In-memory storage implementation
#[derive(Debug, Default)]
pub struct InMemoryCountingStore {
    /// Distinct clients by day
    days: DashMap<Day, HashSet<ClientId>>,
}

impl InMemoryCountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored `(client, day)` records
    pub fn len(&self) -> usize {
        self.days.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.iter().all(|entry| entry.value().is_empty())
    }

    /// Number of days with at least one record
    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    fn union_window(&self, window: DayWindow) -> HashSet<ClientId> {
        let mut seen = HashSet::new();

        // Walk whichever side is smaller: the window's days or the stored days
        if window.len_days() <= self.days.len() as u64 {
            for day in window.days() {
                if let Some(clients) = self.days.get(&day) {
                    seen.extend(clients.iter().copied());
                }
            }
        } else {
            for entry in self.days.iter() {
                if window.contains(*entry.key()) {
                    seen.extend(entry.value().iter().copied());
                }
            }
        }

        seen
    }
}

#[async_trait]
impl CountingStore for InMemoryCountingStore {
    #[instrument(skip(self, deadline))]
    async fn insert(
        &self,
        client_id: ClientId,
        day: Day,
        deadline: Deadline,
    ) -> Result<(), StorageError> {
        deadline.check()?;
        let added = self.days.entry(day).or_default().insert(client_id);
        debug!(added, "Recorded client");
        Ok(())
    }

    #[instrument(skip(self, deadline))]
    async fn count_distinct_on_day(&self, day: Day, deadline: Deadline) -> Result<u64, StorageError> {
        deadline.check()?;
        let count = self
            .days
            .get(&day)
            .map(|clients| clients.len() as u64)
            .unwrap_or(0);
        Ok(count)
    }

    #[instrument(skip(self, deadline))]
    async fn count_distinct_in_window(
        &self,
        window: DayWindow,
        deadline: Deadline,
    ) -> Result<u64, StorageError> {
        deadline.check()?;
        if window.is_empty() {
            return Ok(0);
        }
        Ok(self.union_window(window).len() as u64)
    }

    async fn ping(&self, deadline: Deadline) -> Result<(), StorageError> {
        deadline.check()
    }
}
