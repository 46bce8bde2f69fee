//! silencer-api library interface
//!
//! Exposes the router, services and models for the binary and for
//! integration tests.

pub mod api;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use silencer_common::config::ServiceConfig;
use tower_http::trace::TraceLayer;

use crate::services::{BatchOrchestrator, SingleFileProcessor};

/// Application state shared across handlers
///
/// Immutable after startup; requests share nothing mutable.
#[derive(Clone)]
pub struct AppState {
    /// Validated service configuration
    pub config: Arc<ServiceConfig>,
    /// Per-file and batch processing
    pub orchestrator: Arc<BatchOrchestrator>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// State with the default RMS silence remover
    pub fn new(config: ServiceConfig) -> Self {
        let processor = SingleFileProcessor::new(config.work_dir());
        let orchestrator = BatchOrchestrator::new(processor, config.limits.clone(), &config.batch);
        Self::with_orchestrator(config, orchestrator)
    }

    pub fn with_orchestrator(config: ServiceConfig, orchestrator: BatchOrchestrator) -> Self {
        Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
///
/// The request body limit comes from `limits.max_request_size_bytes`.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.limits.max_request_size_bytes;

    Router::new()
        .merge(api::status_routes())
        .merge(api::process_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
