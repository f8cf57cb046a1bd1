//! Tracing setup

use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;

/// Directives used when `RUST_LOG` is unset
pub const DEFAULT_LOG_DIRECTIVES: &str = "uniques_collector=info,uniques_store=info,tower_http=info";

/// Install the global subscriber
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVES));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
