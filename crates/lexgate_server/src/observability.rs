//! Tracing setup for the lexgate server.
//!
//! Structured logging with an env-filter; JSON formatting is a production
//! toggle. `RUST_LOG` takes precedence over the configured level.

use crate::ServerConfig;
use lexgate_error::{ServerError, ServerErrorKind};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber from server configuration.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_observability(config: &ServerConfig) -> Result<(), ServerError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let result = if config.json_logs {
        let layer = tracing_subscriber::fmt::layer().json().with_filter(filter);
        tracing_subscriber::registry().with(layer).try_init()
    } else {
        let layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_filter(filter);
        tracing_subscriber::registry().with(layer).try_init()
    };

    result.map_err(|e| {
        ServerError::new(ServerErrorKind::Configuration(format!(
            "Failed to initialize tracing: {}",
            e
        )))
    })
}
