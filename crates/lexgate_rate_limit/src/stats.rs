//! Aggregate usage statistics for operational visibility.

use crate::ClientTier;
use crate::usage::UsageStore;
use serde::{Deserialize, Serialize};

/// Seconds within which a client counts as active.
pub(crate) const ACTIVE_WINDOW_SECS: u64 = 300;

/// Cross-client aggregate counters.
///
/// Computed from a walk over the usage map, locking one shard at a time so
/// the admission path never waits behind a whole-map scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitStats {
    /// Number of tracked client records.
    pub total_clients: usize,
    /// Sum of admitted requests across all clients.
    pub total_requests: u64,
    /// Sum of rejections across all clients.
    pub total_violations: u64,
    /// `total_violations / max(1, total_requests)`.
    pub violation_rate: f64,
    /// Clients with a request in the last five minutes.
    pub active_clients: usize,
}

impl RateLimitStats {
    pub(crate) fn aggregate(store: &UsageStore, now: u64) -> Self {
        let (clients, requests, violations, active) = store.fold_records(
            (0usize, 0u64, 0u64, 0usize),
            |(clients, requests, violations, active), record| {
                let is_active =
                    now.saturating_sub(record.last_request_time()) < ACTIVE_WINDOW_SECS;
                (
                    clients + 1,
                    requests + record.total_requests(),
                    violations + record.violations(),
                    active + usize::from(is_active),
                )
            },
        );

        Self {
            total_clients: clients,
            total_requests: requests,
            total_violations: violations,
            violation_rate: violations as f64 / requests.max(1) as f64,
            active_clients: active,
        }
    }
}

/// Per-identity counters for the `my-usage` endpoint.
///
/// Clients the store has never seen get a zeroed snapshot with no request
/// timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Tier the identity classifies into.
    pub client_tier: ClientTier,
    /// Requests counted in the current hour window.
    pub requests_in_window: u32,
    /// Admitted requests over the record's lifetime.
    pub total_requests: u64,
    /// Rejections over the record's lifetime.
    pub violations: u64,
    /// Epoch second of the first observed request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_request: Option<u64>,
    /// Epoch second of the most recent admitted request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_request: Option<u64>,
}
