//! Loctree Web Server
//!
//! HTTP service computing cached line-count statistics and directory trees
//! for remote repositories.

use clap::Parser;
use loctree_core::init_logging;
use loctree_web::{LoctreeServer, ServerConfig, Settings};
use tracing::error;

/// Loctree server - repository line-count analysis over HTTP
#[derive(Parser)]
#[command(name = "loctree-web")]
#[command(about = "Line-count analysis server for remote repositories")]
#[command(version)]
struct Args {
    /// Server host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Load .env before reading any settings from the environment
    dotenvy::dotenv().ok();
    init_logging(&args.log_level);

    let mut config = ServerConfig::from_env();
    config.host = args.host;
    config.port = args.port;

    let settings = Settings::from_env();

    let server = match LoctreeServer::new(config, settings) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to build server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.start().await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }
}
