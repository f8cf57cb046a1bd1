//! Per-operation deadlines
//!
//! Every store operation takes a [`Deadline`] from its caller. Dropping the
//! operation future cancels it; the deadline bounds it when nobody drops it.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use uniques_common::StorageError;

/// Point in time by which a store operation must finish
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Deadline(Instant);

impl Deadline {
    pub fn at(instant: Instant) -> Self {
        Self(instant)
    }

    /// Deadline `timeout` from now
    pub fn after(timeout: Duration) -> Self {
        Self(Instant::now() + timeout)
    }

    pub fn instant(&self) -> Instant {
        self.0
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.0
    }

    /// Time left before expiry (zero once expired)
    pub fn remaining(&self) -> Duration {
        self.0.saturating_duration_since(Instant::now())
    }

    /// Run `op` under this deadline
    ///
    /// Fails fast without polling `op` if the deadline already passed.
    pub async fn run<F, T>(self, op: F) -> Result<T, StorageError>
    where
        F: Future<Output = Result<T, StorageError>>,
    {
        if self.is_expired() {
            return Err(StorageError::DeadlineExceeded);
        }
        tokio::time::timeout_at(self.0, op)
            .await
            .map_err(|_| StorageError::DeadlineExceeded)?
    }

    /// Fail if the deadline already passed
    pub fn check(&self) -> Result<(), StorageError> {
        if self.is_expired() {
            Err(StorageError::DeadlineExceeded)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_run_times_out() {
        let deadline = Deadline::after(Duration::from_millis(50));
        let result: Result<(), _> = deadline
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        assert_eq!(result, Err(StorageError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_run_passes_result_through() {
        let deadline = Deadline::after(Duration::from_secs(5));
        assert_eq!(deadline.run(async { Ok(7u64) }).await, Ok(7));

        let failed: Result<u64, _> = deadline
            .run(async { Err(StorageError::Backend("boom".to_string())) })
            .await;
        assert_eq!(failed, Err(StorageError::Backend("boom".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_deadline_fails_fast() {
        let deadline = Deadline::after(Duration::from_millis(10));
        tokio::time::advance(Duration::from_millis(20)).await;

        assert!(deadline.is_expired());
        assert_eq!(deadline.remaining(), Duration::ZERO);
        assert_eq!(deadline.check(), Err(StorageError::DeadlineExceeded));
    }
}
