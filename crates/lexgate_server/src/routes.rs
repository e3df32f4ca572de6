//! Monitoring routes and router assembly.

use crate::middleware::admission;
use crate::response::{ResponseMetadata, StatsResponse, UsageResponse};
use axum::{
    Extension, Json, Router,
    extract::State,
    middleware::from_fn_with_state,
    routing::get,
};
use lexgate_rate_limit::{ClientIdentity, RateLimiter};
use std::sync::Arc;

/// Shared state handed to every handler.
#[derive(Debug, Clone, derive_getters::Getters)]
pub struct AppState {
    /// The admission-control engine.
    limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Wrap the engine for sharing across handlers.
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        Self { limiter }
    }
}

/// Assemble the monitoring router with the admission middleware applied.
///
/// The monitoring endpoints are themselves rate limited: they sit behind the
/// same middleware as everything else.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/rate-limit/stats", get(stats))
        .route("/rate-limit/my-usage", get(my_usage))
        .layer(from_fn_with_state(state.clone(), admission))
        .with_state(state)
}

/// `GET /rate-limit/stats`: aggregate counters for operators.
async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        success: true,
        data: state.limiter.stats(),
        metadata: ResponseMetadata::now(),
    })
}

/// `GET /rate-limit/my-usage`: the caller's own counters.
async fn my_usage(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
) -> Json<UsageResponse> {
    Json(UsageResponse {
        success: true,
        data: state.limiter.usage(&identity),
    })
}
