//! cuedeck library interface
//!
//! Exposes the application state, router and domain modules so the
//! integration suite can drive the service in-process.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use crate::error::{ApiError, ApiResult, Error, Result};

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::trace::TraceLayer;

use crate::services::Recommender;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Session/recommendation orchestration
    pub recommender: Arc<Recommender>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(recommender: Arc<Recommender>) -> Self {
        Self {
            recommender,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::set_routes())
        .merge(api::browse_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
