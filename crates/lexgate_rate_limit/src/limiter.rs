//! Admission control across tiers, endpoints, and time windows.

use crate::usage::UsageStore;
use crate::{
    ClientIdentity, ClientTier, Clock, Decision, LexgateConfig, PolicyResolver, RateLimitStats,
    SystemClock, TierRegistry, UsageSnapshot, WindowKind,
};
use lexgate_error::LexgateResult;
use std::sync::Arc;
use tracing::{debug, instrument};

/// The admission-control engine.
///
/// One instance is constructed at process start and shared behind an `Arc`;
/// handlers receive a reference rather than reaching for a global. `check`
/// is in-memory arithmetic plus one shard-lock acquisition and never blocks
/// on I/O, so it is safe to call synchronously from any request thread.
///
/// Window semantics are fixed-window with independent counters: a request
/// must pass every enforced window (minute, hour, day), and each window
/// resets exactly when its duration has elapsed since the window start.
#[derive(Debug)]
pub struct RateLimiter {
    registry: TierRegistry,
    resolver: PolicyResolver,
    store: UsageStore,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create an engine using the system clock.
    pub fn new(registry: TierRegistry, resolver: PolicyResolver) -> Self {
        Self::with_clock(registry, resolver, Arc::new(SystemClock::new()))
    }

    /// Create an engine with an injected clock.
    pub fn with_clock(
        registry: TierRegistry,
        resolver: PolicyResolver,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            resolver,
            store: UsageStore::new(),
            clock,
        }
    }

    /// Build an engine from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the tier table is incomplete or any
    /// policy carries a zero limit.
    pub fn from_config(config: &LexgateConfig) -> LexgateResult<Self> {
        Ok(Self::new(config.tier_registry(), config.policy_resolver()?))
    }

    /// Tier the given identity classifies into.
    pub fn classify(&self, identity: &ClientIdentity) -> ClientTier {
        self.registry.classify(identity)
    }

    /// Decide admission for one request arriving now.
    #[instrument(skip(self, identity), fields(identity = %identity))]
    pub fn check(&self, identity: &ClientIdentity, route: &str) -> Decision {
        self.check_at(identity, route, self.clock.now_epoch())
    }

    /// Decide admission for one request at an explicit time.
    ///
    /// The reset pass, the violation scan, and every counter update happen
    /// atomically under the identity's shard lock, so the admitted count in
    /// a window can never exceed its limit no matter how many callers race.
    /// Windows are scanned tightest-first (minute, hour, day) and the
    /// reported `retry_after` comes from the first violated window.
    pub fn check_at(&self, identity: &ClientIdentity, route: &str, now: u64) -> Decision {
        let tier = self.registry.classify(identity);
        let policy = self.resolver.resolve(tier, route);
        let hour_secs = WindowKind::Hour.duration_secs();

        self.store.with_record(identity, now, |record| {
            record.roll_windows(now);

            if let Some(violated) = record.first_violation(&policy) {
                record.record_violation();
                let retry_after = record.counter(violated).seconds_until_reset(violated, now);
                let hour = record.counter(WindowKind::Hour);
                debug!(%tier, %violated, retry_after, "request rejected");
                return Decision {
                    allowed: false,
                    limit: policy.requests_per_hour,
                    remaining: policy.requests_per_hour.saturating_sub(hour.count()),
                    reset_epoch: hour.window_start() + hour_secs,
                    window_seconds: hour_secs,
                    policy: policy.description(),
                    tier,
                    burst_allowance: policy.burst_allowance,
                    retry_after: Some(retry_after),
                };
            }

            record.record_admission(&policy, now);
            let hour = record.counter(WindowKind::Hour);
            let remaining = policy.requests_per_hour.saturating_sub(hour.count());
            debug!(%tier, remaining, "request admitted");
            Decision {
                allowed: true,
                limit: policy.requests_per_hour,
                remaining,
                reset_epoch: hour.window_start() + hour_secs,
                window_seconds: hour_secs,
                policy: policy.description(),
                tier,
                burst_allowance: policy.burst_allowance,
                retry_after: None,
            }
        })
    }

    /// Aggregate counters across all tracked clients.
    pub fn stats(&self) -> RateLimitStats {
        self.stats_at(self.clock.now_epoch())
    }

    /// Aggregate counters at an explicit time.
    pub fn stats_at(&self, now: u64) -> RateLimitStats {
        RateLimitStats::aggregate(&self.store, now)
    }

    /// Usage snapshot for one identity.
    pub fn usage(&self, identity: &ClientIdentity) -> UsageSnapshot {
        let tier = self.registry.classify(identity);
        match self.store.get(identity) {
            Some(record) => UsageSnapshot {
                client_tier: tier,
                requests_in_window: record.counter(WindowKind::Hour).count(),
                total_requests: record.total_requests(),
                violations: record.violations(),
                first_request: Some(record.first_request_time()),
                last_request: Some(record.last_request_time()),
            },
            None => UsageSnapshot {
                client_tier: tier,
                requests_in_window: 0,
                total_requests: 0,
                violations: 0,
                first_request: None,
                last_request: None,
            },
        }
    }

    /// Evict records idle longer than the threshold, returning the eviction
    /// count. Called by the reaper on its own schedule, never from the
    /// request path.
    pub fn evict_idle(&self, idle_threshold_secs: u64) -> usize {
        self.evict_idle_at(self.clock.now_epoch(), idle_threshold_secs)
    }

    /// Evict idle records at an explicit time.
    pub fn evict_idle_at(&self, now: u64, idle_threshold_secs: u64) -> usize {
        self.store.evict_idle(now, idle_threshold_secs)
    }
}
