//! Listener lifecycle for the lexgate server.

use crate::routes::{AppState, router};
use crate::ServerConfig;
use lexgate_error::{ServerError, ServerErrorKind};
use lexgate_rate_limit::RateLimiter;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, instrument};

/// Bind the configured address and serve until the listener fails.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or serving fails.
#[instrument(skip(config, limiter), fields(bind = %config.bind))]
pub async fn serve(config: ServerConfig, limiter: Arc<RateLimiter>) -> Result<(), ServerError> {
    let state = AppState::new(limiter);
    let app = router(state).into_make_service_with_connect_info::<SocketAddr>();

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .map_err(|e| {
            ServerError::new(ServerErrorKind::Bind(format!("{}: {}", config.bind, e)))
        })?;

    info!("lexgate listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::new(ServerErrorKind::Serve(e.to_string())))
}
