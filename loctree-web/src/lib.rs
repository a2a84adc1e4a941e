//! Loctree Web Server
//!
//! HTTP interface for the loctree analysis service: each request resolves a
//! cache hit or triggers a fetch-and-count pass, then folds the result into a
//! depth-bounded directory tree plus a per-language breakdown.

pub mod handlers;
pub mod routes;
pub mod server;
pub mod settings;
pub mod state;

// Re-export main types
pub use server::LoctreeServer;
pub use settings::{Settings, SettingsUpdate, SharedSettings};
pub use state::AppState;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        Method, StatusCode,
    },
    response::{IntoResponse, Json, Response},
    Router,
};
use loctree_core::LoctreeError;
use tower_http::{catch_panic::CatchPanicLayer, cors::Any, cors::CorsLayer, trace::TraceLayer};
use tracing::error;

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    // The original consumer is a browser extension, so CORS stays wide open
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    Router::new()
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// Contain any panic escaping a handler and report it as a generic internal
/// failure instead of tearing down the connection.
fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    };

    error!(panic = %detail, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(handlers::ApiResponse::<()>::error(
            500,
            format!("Internal server error: {}", detail),
        )),
    )
        .into_response()
}

/// Configuration for the web server process itself
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("LOCTREE_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("LOCTREE_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        }
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Analysis timed out after {0} seconds")]
    Timeout(u64),

    #[error("Analysis failed: {0}")]
    Analysis(#[from] LoctreeError),
}

impl WebError {
    fn status_code(&self) -> StatusCode {
        match self {
            WebError::Validation(_) => StatusCode::BAD_REQUEST,
            WebError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            WebError::Analysis(err) if err.is_preflight() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = handlers::ApiResponse::<()>::error(status.as_u16(), self.to_string());
        (status, Json(body)).into_response()
    }
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_web_error_status_mapping() {
        assert_eq!(
            WebError::Validation("repo_url is required".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebError::Timeout(120).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        let err = loctree_core::repository_error!("clone failed", "fetcher");
        assert_eq!(
            WebError::Analysis(err).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
