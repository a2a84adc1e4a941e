//! Loctree Web Server
//!
//! Server bootstrap: builds shared state, starts the cache sweeper, serves.

use crate::{create_app, AppState, ServerConfig, Settings, WebError, WebResult};
use axum::serve;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Interval for the background sweep that reclaims expired cache entries
const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

/// Main loctree web server
pub struct LoctreeServer {
    config: ServerConfig,
    state: AppState,
}

impl LoctreeServer {
    /// Create a new server with the default GitHub fetcher.
    pub fn new(config: ServerConfig, settings: Settings) -> WebResult<Self> {
        let state = AppState::new(settings)?;
        Ok(Self { config, state })
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("Starting loctree web server on http://{}", address);

        // Expired entries are also rejected at read time; the sweep only
        // reclaims memory.
        self.state.cache.spawn_sweeper(CACHE_SWEEP_INTERVAL);

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("Server listening on http://{}", address);

        if let Err(e) = serve(listener, app).await {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}
