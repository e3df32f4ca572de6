//! Admission decisions returned by the rate limiter.

use crate::ClientTier;
use serde::Serialize;

/// Outcome of one admission check.
///
/// A rejected request is a normal decision value, not an error; callers
/// translate it into an HTTP 429 with the standard quota headers. The
/// hourly window is always the headline metric: `limit`, `remaining`,
/// `reset_epoch`, and `window_seconds` describe the hour window even when a
/// different window triggered the rejection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// The effective hourly limit.
    pub limit: u32,
    /// Requests left in the current hour window.
    pub remaining: u32,
    /// Epoch second at which the hour window resets.
    pub reset_epoch: u64,
    /// Size of the headline window in seconds.
    pub window_seconds: u64,
    /// Human-readable policy string, e.g. `"100 per hour"`.
    pub policy: String,
    /// Tier the caller was classified into.
    pub tier: ClientTier,
    /// Documented burst slack from the effective policy. Metadata only;
    /// window limits are enforced as configured.
    pub burst_allowance: u32,
    /// Seconds until the violated window resets. Present iff rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}
