//! Route definitions for the loctree web server

use crate::{handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Repository analysis
        .route("/analyze", post(handlers::analyze))
        // Configuration
        .route(
            "/config",
            get(handlers::get_config).post(handlers::update_config),
        )
}
