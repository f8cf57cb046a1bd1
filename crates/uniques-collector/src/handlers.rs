//! Ingest and query logic
//!
//! Framework-free: every function validates raw parameter text, then makes
//! exactly one store call. Validation failures never reach the store.

use tracing::{debug, instrument};
use uniques_common::{ClientId, Day, DayWindow, Result};
use uniques_store::{CountingStore, Deadline};

/// Record a ping from `cid`, on the day of `timestamp` or today (UTC)
///
/// An absent or empty timestamp means "now". Returns the day the ping was
/// bucketed into.
#[instrument(skip(store, deadline))]
pub async fn record(
    store: &dyn CountingStore,
    cid: &str,
    timestamp: Option<&str>,
    deadline: Deadline,
) -> Result<Day> {
    let client_id = ClientId::parse(cid)?;
    let day = match timestamp {
        Some(raw) if !raw.is_empty() => Day::parse_timestamp(raw)?,
        _ => Day::today(),
    };

    store.insert(client_id, day, deadline).await?;
    debug!(%client_id, %day, "Collected ping");
    Ok(day)
}

/// Distinct clients seen on `date` (`YYYYMMDD`)
#[instrument(skip(store, deadline))]
pub async fn daily_count(store: &dyn CountingStore, date: &str, deadline: Deadline) -> Result<u64> {
    let day = Day::parse(date)?;
    Ok(store.count_distinct_on_day(day, deadline).await?)
}

/// Distinct clients from one calendar month before `date` through `date`
#[instrument(skip(store, deadline))]
pub async fn monthly_count(store: &dyn CountingStore, date: &str, deadline: Deadline) -> Result<u64> {
    let window = DayWindow::trailing_month(Day::parse(date)?);
    Ok(store.count_distinct_in_window(window, deadline).await?)
}
