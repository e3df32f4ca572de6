//! Request admission control and rate limiting for the lexgate API.
//!
//! This crate decides, for every inbound request, whether the calling client
//! may proceed. It tracks quota usage across independent fixed time windows
//! (minute, hour, day), differentiates policy by client tier and by endpoint,
//! and renders standardized quota headers.
//!
//! ## Pipeline
//!
//! An inbound request flows through:
//! 1. [`ClientIdentity::from_meta`]: hash-derived identity from request
//!    metadata.
//! 2. [`TierRegistry::classify`]: identity to service tier.
//! 3. [`PolicyResolver::resolve`]: tier default merged with any endpoint
//!    override into the effective policy.
//! 4. [`RateLimiter::check`]: atomic admission decision and counter update.
//! 5. [`Decision::headers`]: standard quota headers for the response.
//!
//! ## Example
//!
//! ```
//! use lexgate_rate_limit::{ClientIdentity, RateLimiter, RequestMeta};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = lexgate_rate_limit::LexgateConfig::load()?;
//! let limiter = RateLimiter::from_config(&config)?;
//!
//! let meta = RequestMeta {
//!     api_key: Some("my-key".to_string()),
//!     ..RequestMeta::default()
//! };
//! let identity = ClientIdentity::from_meta(&meta);
//!
//! let decision = limiter.check(&identity, "/api/v1/search/precedents");
//! assert!(decision.allowed);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod config;
mod decision;
mod error;
mod headers;
mod identity;
mod limiter;
mod policy;
mod reaper;
mod stats;
mod tier;
mod usage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{KeyConfig, LexgateConfig, ServerSettings};
pub use decision::Decision;
pub use error::{RateLimitError, RateLimitErrorKind};
pub use headers::{
    RETRY_AFTER, X_RATE_LIMIT_LIMIT, X_RATE_LIMIT_POLICY, X_RATE_LIMIT_REMAINING,
    X_RATE_LIMIT_RESET, X_RATE_LIMIT_WINDOW,
};
pub use identity::{ClientIdentity, RequestMeta};
pub use limiter::RateLimiter;
pub use policy::{PolicyResolver, QuotaPolicy, TierPolicies};
pub use reaper::{Reaper, ReaperConfig};
pub use stats::{RateLimitStats, UsageSnapshot};
pub use tier::{ClientTier, TierRegistry};
pub use usage::WindowKind;
