//! Wire types for monitoring payloads and rejection bodies.

use chrono::Utc;
use lexgate_rate_limit::{Decision, RateLimitStats, UsageSnapshot};
use serde::{Deserialize, Serialize};

/// Timestamp and version stamped onto monitoring payloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseMetadata {
    /// Epoch second the payload was produced.
    pub timestamp: i64,
    /// Server version.
    pub version: String,
}

impl ResponseMetadata {
    /// Metadata stamped at the current time.
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now().timestamp(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Payload for `GET /rate-limit/stats`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatsResponse {
    /// Always true for a served payload.
    pub success: bool,
    /// Aggregate counters.
    pub data: RateLimitStats,
    /// Payload metadata.
    pub metadata: ResponseMetadata,
}

/// Payload for `GET /rate-limit/my-usage`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsageResponse {
    /// Always true for a served payload.
    pub success: bool,
    /// The caller's own usage counters.
    pub data: UsageSnapshot,
}

/// Structured body returned with HTTP 429.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateLimitErrorBody {
    /// The error envelope.
    pub error: RateLimitErrorDetail,
}

/// Error envelope carried by a 429 response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateLimitErrorDetail {
    /// Stable machine-readable code, always `RATE_LIMIT_EXCEEDED`.
    pub code: String,
    /// Human-readable message including the violated policy.
    pub message: String,
    /// Quota details for the caller.
    pub details: RateLimitErrorContext,
}

/// Quota details nested in a 429 body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateLimitErrorContext {
    /// Effective hourly limit.
    pub limit: u32,
    /// Headline window size in seconds.
    pub window: u64,
    /// Seconds until the violated window resets.
    pub retry_after: Option<u64>,
}

impl RateLimitErrorBody {
    /// Build the 429 body for a rejected decision.
    pub fn from_decision(decision: &Decision) -> Self {
        Self {
            error: RateLimitErrorDetail {
                code: "RATE_LIMIT_EXCEEDED".to_string(),
                message: format!("Rate limit exceeded. {}", decision.policy),
                details: RateLimitErrorContext {
                    limit: decision.limit,
                    window: decision.window_seconds,
                    retry_after: decision.retry_after,
                },
            },
        }
    }
}
