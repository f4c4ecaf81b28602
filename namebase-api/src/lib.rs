//! namebase-api library interface
//!
//! Caching front for a name-nationality predictor and a country metadata
//! service. Exposes the router and state so integration tests can drive the
//! service in-process.

pub mod api;
pub mod cli;
pub mod db;
pub mod error;
pub mod logging;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use anyhow::{Context, Result};
use axum::{middleware, Router};
use chrono::{DateTime, Utc};
use namebase_common::config::ServiceConfig;
use namebase_common::time;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::ClientRateLimiter;
use crate::services::{NationalizeClient, Reconciler, RestCountriesClient};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Freshness reconciliation engine
    pub reconciler: Arc<Reconciler>,
    /// Per-client request quota (`None` when throttling is off)
    pub rate_limiter: Option<Arc<ClientRateLimiter>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, reconciler: Arc<Reconciler>) -> Self {
        Self {
            db,
            reconciler,
            rate_limiter: None,
            startup_time: Utc::now(),
        }
    }

    /// Throttle lookups to `per_minute` requests per client (0 disables)
    pub fn with_rate_limit(mut self, per_minute: u32) -> Self {
        self.rate_limiter = api::client_rate_limiter(per_minute).map(Arc::new);
        self
    }

    /// Wire the real upstream clients from resolved configuration
    pub fn from_config(db: SqlitePool, config: &ServiceConfig) -> Result<Self> {
        let predictor = NationalizeClient::new(&config.upstream)
            .context("Failed to build name predictor client")?;
        let metadata = RestCountriesClient::new(&config.upstream)
            .context("Failed to build country metadata client")?;

        let reconciler = Reconciler::new(
            db.clone(),
            Arc::new(predictor),
            Arc::new(metadata),
            time::hours(config.freshness_window_hours),
        );

        Ok(Self::new(db, Arc::new(reconciler)).with_rate_limit(config.rate_limit_per_minute))
    }
}

/// Build application router
///
/// Lookup endpoints sit behind the per-client throttle; `/health` does not.
pub fn build_router(state: AppState) -> Router {
    let throttled = Router::new()
        .merge(api::name_routes())
        .merge(api::popular_routes())
        .layer(middleware::from_fn_with_state(state.clone(), api::throttle));

    Router::new()
        .merge(throttled)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
