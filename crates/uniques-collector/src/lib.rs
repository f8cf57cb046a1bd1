//! # Uniques Collector
//!
//! Accepts client pings over HTTP, records them keyed by UTC day, and
//! answers distinct-client counts per day and per trailing month.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │                  axum Router                       │
//! │  /collect      /daily_uniques   /monthly_uniques   │
//! │      │                │                 │          │
//! │  ┌───┴─────┐   ┌──────┴─────────────────┴──────┐   │
//! │  │ Ingest  │   │           Query               │   │
//! │  │ record  │   │  daily_count  monthly_count   │   │
//! │  └───┬─────┘   └──────────────┬────────────────┘   │
//! │      │                        │                    │
//! │  ┌───┴────────────────────────┴───────────────┐    │
//! │  │        Arc<dyn CountingStore>              │    │
//! │  │  (Redis day sets | in-memory DashMap)      │    │
//! │  └────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::CollectorConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;

/// Collector version
pub const COLLECTOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Ping endpoint
pub const COLLECT_PATH: &str = "/collect";

/// Distinct clients on one day
pub const DAILY_UNIQUES_PATH: &str = "/daily_uniques";

/// Distinct clients over the trailing month
pub const MONTHLY_UNIQUES_PATH: &str = "/monthly_uniques";

/// Liveness endpoint
pub const HEALTH_PATH: &str = "/health";

/// Content type of the collect and count responses
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// Default per-request store deadline in milliseconds
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;
