//! namebase-api - caching name nationality service
//!
//! Serves per-name country predictions and per-country name popularity,
//! fetching from the upstream APIs only when cached data is missing or stale.

use anyhow::{Context, Result};
use clap::Parser;
use namebase_api::cli::{Args, ConfigSource};
use namebase_api::logging::init_tracing;
use namebase_api::{build_router, AppState};
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (config, source) = args.load_config().context("Failed to load configuration")?;

    init_tracing(&config.logging)?;

    info!(
        "Starting namebase-api v{}",
        env!("CARGO_PKG_VERSION")
    );
    match &source {
        ConfigSource::File(path) => info!("Loaded config file {}", path.display()),
        ConfigSource::Missing(path) => {
            warn!("Config file not found at {}, using defaults", path.display())
        }
        ConfigSource::Defaults => warn!("No config directory available, using defaults"),
    }
    info!("Predictor: {}", config.upstream.predictor_url);
    info!("Country metadata: {}", config.upstream.metadata_url);
    info!(
        "Freshness window: {} h, upstream timeout: {:?}",
        config.freshness_window_hours, config.upstream.timeout
    );
    info!("Database: {}", config.database_path.display());
    if config.rate_limit_per_minute == 0 {
        info!("Request throttling disabled");
    } else {
        info!("Request limit: {} per minute per client", config.rate_limit_per_minute);
    }

    let pool = namebase_common::db::init_database(&config.database_path)
        .await
        .context("Failed to initialize database")?;
    info!("Database connection established");

    let state = AppState::from_config(pool, &config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;
    info!("Listening on http://{}", config.bind);
    info!("Health check: http://{}/health", config.bind);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
