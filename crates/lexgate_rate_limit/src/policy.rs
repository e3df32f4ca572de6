//! Quota policies and tier/endpoint policy resolution.

use crate::{ClientTier, RateLimitError, RateLimitErrorKind, WindowKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// Quota limits for one tier or endpoint.
///
/// The hourly limit is always present; minute and day limits are optional,
/// where `None` means that window is not enforced. Burst allowance is
/// configuration metadata surfaced to operators in decisions and never
/// relaxes a window limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct QuotaPolicy {
    /// Requests allowed per hour window.
    pub requests_per_hour: u32,

    /// Requests allowed per minute window, if enforced.
    #[serde(default)]
    pub requests_per_minute: Option<u32>,

    /// Requests allowed per day window, if enforced.
    #[serde(default)]
    pub requests_per_day: Option<u32>,

    /// Documented slack for request spikes.
    #[serde(default = "default_burst_allowance")]
    pub burst_allowance: u32,
}

fn default_burst_allowance() -> u32 {
    10
}

impl QuotaPolicy {
    /// The limit enforced for a window, if any. The hour window is always
    /// enforced.
    pub(crate) fn limit_for(&self, window: WindowKind) -> Option<u32> {
        match window {
            WindowKind::Minute => self.requests_per_minute,
            WindowKind::Hour => Some(self.requests_per_hour),
            WindowKind::Day => self.requests_per_day,
        }
    }

    /// Element-wise minimum of two policies.
    ///
    /// An absent optional limit on either side is no constraint, so the
    /// other side's limit (or absence) carries through.
    pub fn merge_restrictive(&self, other: &Self) -> Self {
        Self {
            requests_per_hour: self.requests_per_hour.min(other.requests_per_hour),
            requests_per_minute: min_limit(self.requests_per_minute, other.requests_per_minute),
            requests_per_day: min_limit(self.requests_per_day, other.requests_per_day),
            burst_allowance: self.burst_allowance.min(other.burst_allowance),
        }
    }

    /// Validate that every configured limit is positive.
    ///
    /// # Errors
    ///
    /// Returns `RateLimitErrorKind::InvalidPolicy` if any limit is zero.
    pub fn validate(&self) -> Result<(), RateLimitError> {
        if self.requests_per_hour == 0 {
            return Err(RateLimitError::new(RateLimitErrorKind::InvalidPolicy(
                "requests_per_hour must be at least 1".to_string(),
            )));
        }
        if self.requests_per_minute == Some(0) {
            return Err(RateLimitError::new(RateLimitErrorKind::InvalidPolicy(
                "requests_per_minute must be at least 1 when set".to_string(),
            )));
        }
        if self.requests_per_day == Some(0) {
            return Err(RateLimitError::new(RateLimitErrorKind::InvalidPolicy(
                "requests_per_day must be at least 1 when set".to_string(),
            )));
        }
        Ok(())
    }

    /// Human-readable policy string for the `X-RateLimit-Policy` header.
    pub fn description(&self) -> String {
        format!("{} per hour", self.requests_per_hour)
    }
}

/// Per-tier default quota policies.
///
/// Holding one field per tier (rather than a map) makes a missing tier
/// unrepresentable once configuration has been validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPolicies {
    /// Policy for anonymous callers.
    pub default: QuotaPolicy,
    /// Policy for credentialed callers.
    pub authenticated: QuotaPolicy,
    /// Policy for premium callers.
    pub premium: QuotaPolicy,
    /// Policy for operator keys.
    pub admin: QuotaPolicy,
}

impl TierPolicies {
    /// The default policy for a tier.
    pub fn for_tier(&self, tier: ClientTier) -> QuotaPolicy {
        match tier {
            ClientTier::Default => self.default,
            ClientTier::Authenticated => self.authenticated,
            ClientTier::Premium => self.premium,
            ClientTier::Admin => self.admin,
        }
    }
}

/// Resolves the binding quota for a (tier, route) pair.
///
/// Tier defaults and endpoint overrides are configuration, not per-request
/// state, so resolved policies are memoized per pair. Resolution is the
/// element-wise minimum of the tier policy and any endpoint override.
#[derive(Debug)]
pub struct PolicyResolver {
    tiers: TierPolicies,
    endpoints: HashMap<String, QuotaPolicy>,
    cache: RwLock<HashMap<(ClientTier, String), QuotaPolicy>>,
}

impl PolicyResolver {
    /// Build a resolver, validating every policy up front.
    ///
    /// # Errors
    ///
    /// Returns `RateLimitErrorKind::InvalidPolicy` if any tier or endpoint
    /// policy carries a zero limit.
    pub fn new(
        tiers: TierPolicies,
        endpoints: HashMap<String, QuotaPolicy>,
    ) -> Result<Self, RateLimitError> {
        for tier in [&tiers.default, &tiers.authenticated, &tiers.premium, &tiers.admin] {
            tier.validate()?;
        }
        for policy in endpoints.values() {
            policy.validate()?;
        }
        Ok(Self {
            tiers,
            endpoints,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// The effective policy for a tier on a route.
    ///
    /// Invariant: the effective hourly limit never exceeds the tier's hourly
    /// limit.
    pub fn resolve(&self, tier: ClientTier, route: &str) -> QuotaPolicy {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(policy) = cache.get(&(tier, route.to_string())) {
                return *policy;
            }
        }

        let tier_policy = self.tiers.for_tier(tier);
        let effective = match self.endpoints.get(route) {
            Some(endpoint_policy) => tier_policy.merge_restrictive(endpoint_policy),
            None => tier_policy,
        };

        debug!(%tier, route, limit = effective.requests_per_hour, "resolved effective policy");

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.insert((tier, route.to_string()), effective);
        effective
    }
}

fn min_limit(a: Option<u32>, b: Option<u32>) -> Option<u32> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (limit, None) => limit,
        (None, limit) => limit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(hour: u32, minute: Option<u32>, day: Option<u32>) -> QuotaPolicy {
        QuotaPolicy {
            requests_per_hour: hour,
            requests_per_minute: minute,
            requests_per_day: day,
            burst_allowance: 10,
        }
    }

    fn tiers() -> TierPolicies {
        TierPolicies {
            default: policy(100, Some(10), Some(500)),
            authenticated: policy(1000, Some(50), Some(5000)),
            premium: policy(5000, Some(200), Some(25000)),
            admin: policy(10000, Some(500), Some(100000)),
        }
    }

    #[test]
    fn test_merge_takes_element_wise_minimum() {
        let merged = policy(1000, Some(50), None).merge_restrictive(&policy(50, Some(5), None));
        assert_eq!(merged.requests_per_hour, 50);
        assert_eq!(merged.requests_per_minute, Some(5));
        assert_eq!(merged.requests_per_day, None);
    }

    #[test]
    fn test_merge_skips_absent_limits() {
        let merged = policy(200, None, Some(400)).merge_restrictive(&policy(300, Some(20), None));
        assert_eq!(merged.requests_per_hour, 200);
        assert_eq!(merged.requests_per_minute, Some(20));
        assert_eq!(merged.requests_per_day, Some(400));
    }

    #[test]
    fn test_resolve_without_override_returns_tier_policy() {
        let resolver = PolicyResolver::new(tiers(), HashMap::new()).unwrap();
        let effective = resolver.resolve(ClientTier::Authenticated, "/api/v1/anything");
        assert_eq!(effective, tiers().authenticated);
    }

    #[test]
    fn test_resolve_applies_endpoint_override() {
        let mut endpoints = HashMap::new();
        endpoints.insert("/api/v1/heavy".to_string(), policy(50, Some(5), None));
        let resolver = PolicyResolver::new(tiers(), endpoints).unwrap();

        let effective = resolver.resolve(ClientTier::Authenticated, "/api/v1/heavy");
        assert_eq!(effective.requests_per_hour, 50);
        assert_eq!(effective.requests_per_minute, Some(5));
        // Tier's daily limit carries through an override without one.
        assert_eq!(effective.requests_per_day, Some(5000));
        assert!(effective.requests_per_hour <= tiers().authenticated.requests_per_hour);
    }

    #[test]
    fn test_resolve_is_memoized() {
        let resolver = PolicyResolver::new(tiers(), HashMap::new()).unwrap();
        let first = resolver.resolve(ClientTier::Premium, "/api/v1/x");
        let second = resolver.resolve(ClientTier::Premium, "/api/v1/x");
        assert_eq!(first, second);
        let cache = resolver.cache.read().unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_limit_rejected() {
        assert!(policy(0, None, None).validate().is_err());
        assert!(policy(10, Some(0), None).validate().is_err());
        assert!(policy(10, Some(1), Some(0)).validate().is_err());
        assert!(policy(10, None, None).validate().is_ok());
    }

    #[test]
    fn test_policy_description() {
        assert_eq!(policy(100, None, None).description(), "100 per hour");
    }
}
