//! groupwise-server library - affinity grouping over HTTP
//!
//! Exposes the grouping engine as a stateless JSON service. Every request
//! carries its whole roster; the server keeps only the configured defaults.

use axum::Router;
use groupwise_common::config::GroupingDefaults;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Fallbacks for values a request leaves out
    pub defaults: Arc<GroupingDefaults>,
}

impl AppState {
    /// Create new application state
    pub fn new(defaults: GroupingDefaults) -> Self {
        Self {
            defaults: Arc::new(defaults),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::groups_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
