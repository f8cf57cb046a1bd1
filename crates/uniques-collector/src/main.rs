//! Uniques Collector Binary

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use uniques_collector::{
    config::CollectorConfig, create_router, state::build_store, telemetry, AppState,
    COLLECTOR_VERSION, COLLECT_PATH, DAILY_UNIQUES_PATH, HEALTH_PATH, MONTHLY_UNIQUES_PATH,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Collects client pings and serves daily and monthly unique counts")]
struct Args {
    /// YAML config file; ./config.yml is read when present otherwise
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = CollectorConfig::load(args.config.as_deref())?;

    // Initialize tracing
    telemetry::init_tracing(config.logging.format);

    info!("Starting Uniques Collector v{}", COLLECTOR_VERSION);
    info!(
        "Store config: backend={:?}, max_connections={}, key_prefix={}, retention_days={}",
        config.store.backend,
        config.store.max_connections,
        config.store.key_prefix,
        config.store.retention_days
    );

    // Connect the counting store; failure here is fatal
    let store = build_store(&config.store).await.map_err(|e| {
        error!(error = %e, "Failed to initialize counting store");
        e
    })?;

    let state = AppState::new(store, config.server.request_timeout());
    let app = create_router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Uniques Collector listening on {}", addr);
    info!(
        "Endpoints: {}, {}, {}, {}",
        COLLECT_PATH, DAILY_UNIQUES_PATH, MONTHLY_UNIQUES_PATH, HEALTH_PATH
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down Uniques Collector");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Received shutdown signal");
}
