//! # Uniques Common
//!
//! Shared types and errors for the uniques collector.
//!
//! ## Core Types
//!
//! - [`ClientId`]: 128-bit client identifier carried by every ping
//! - [`Day`]: UTC calendar day that events are bucketed into
//! - [`DayWindow`]: inclusive range of days used by aggregate queries
//!
//! ## Errors
//!
//! - [`ValidationError`]: malformed caller input, never touches storage
//! - [`StorageError`]: backend failure, missed deadline or cancellation
//! - [`UniquesError`]: unified error carried across crate boundaries

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{Result, StorageError, UniquesError, ValidationError};
pub use types::{
    client_id::ClientId,
    day::{Day, DayWindow},
};

/// Uniques version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Wire format of a day: `YYYYMMDD`
pub const DAY_FORMAT: &str = "%Y%m%d";

/// Longest trailing month window, in days (31-day month plus the anchor day)
pub const MAX_MONTH_WINDOW_DAYS: i64 = 32;
