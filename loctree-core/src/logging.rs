//! Logging initialization for the loctree service

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` takes precedence; `default_level` is used when it is unset,
/// scoped to the loctree crates plus tower-http request traces.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "loctree_core={level},loctree_stats={level},loctree_repo={level},loctree_web={level},tower_http=info",
            level = default_level
        ))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}
