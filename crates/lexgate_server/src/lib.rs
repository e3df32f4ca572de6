//! HTTP wiring for the lexgate admission-control engine.
//!
//! This crate connects the engine in `lexgate_rate_limit` to an axum server:
//! an admission middleware that gates every route, monitoring endpoints for
//! operators, the structured 429 body, and tracing setup.
//!
//! # Example
//!
//! ```rust,no_run
//! use lexgate_rate_limit::{LexgateConfig, RateLimiter};
//! use lexgate_server::{ServerConfig, serve};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = LexgateConfig::load()?;
//!     let limiter = Arc::new(RateLimiter::from_config(&config)?);
//!     let server_config = ServerConfig::from_settings(&config.server);
//!
//!     serve(server_config, limiter).await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod middleware;
mod observability;
mod response;
mod routes;
mod server;

pub use config::{ServerConfig, ServerConfigBuilder};
pub use lexgate_error::{ServerError, ServerErrorKind};
pub use middleware::admission;
pub use observability::init_observability;
pub use response::{
    RateLimitErrorBody, RateLimitErrorContext, RateLimitErrorDetail, ResponseMetadata,
    StatsResponse, UsageResponse,
};
pub use routes::{AppState, router};
pub use server::serve;
