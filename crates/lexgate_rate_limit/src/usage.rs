//! Per-client usage accounting across fixed time windows.
//!
//! Every client identity owns one `UsageRecord` holding an independent
//! fixed-window counter per window size. Records live in a sharded map; a
//! record is only ever created or mutated while its shard lock is held, which
//! makes each admission decision atomic with respect to concurrent requests
//! for the same client.

use crate::{ClientIdentity, QuotaPolicy, RateLimitError, RateLimitErrorKind};
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, PoisonError};
use tracing::error;

/// Number of independently-locked shards in the usage map.
///
/// A throughput tunable, not a correctness requirement: one global lock
/// would also be correct, just contended under high client cardinality.
const SHARD_COUNT: usize = 16;

/// Fixed counting windows tracked per client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum WindowKind {
    /// 60-second window.
    Minute,
    /// 3600-second window. Always enforced; the headline metric in
    /// decisions and headers.
    Hour,
    /// 86400-second window.
    Day,
}

impl WindowKind {
    /// Windows in violation-scan order: tightest first, so the reported
    /// retry time is the shortest accurate wait.
    pub const ORDERED: [WindowKind; 3] = [WindowKind::Minute, WindowKind::Hour, WindowKind::Day];

    /// Duration of this window in seconds.
    pub const fn duration_secs(self) -> u64 {
        match self {
            WindowKind::Minute => 60,
            WindowKind::Hour => 3600,
            WindowKind::Day => 86400,
        }
    }
}

/// One fixed window: a count and the epoch second the window began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WindowCounter {
    count: u32,
    window_start: u64,
}

impl WindowCounter {
    fn new(now: u64) -> Self {
        Self {
            count: 0,
            window_start: now,
        }
    }

    /// Reset the counter iff the window has elapsed. The window start only
    /// ever advances to `now` at the moment of reset (fixed windows, not
    /// sliding).
    fn roll(&mut self, kind: WindowKind, now: u64) {
        if now.saturating_sub(self.window_start) >= kind.duration_secs() {
            self.count = 0;
            self.window_start = now;
        }
    }

    pub(crate) fn count(&self) -> u32 {
        self.count
    }

    pub(crate) fn window_start(&self) -> u64 {
        self.window_start
    }

    /// Seconds until this window resets, never less than 1.
    pub(crate) fn seconds_until_reset(&self, kind: WindowKind, now: u64) -> u64 {
        kind.duration_secs()
            .saturating_sub(now.saturating_sub(self.window_start))
            .max(1)
    }
}

/// Usage counters for one client identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UsageRecord {
    minute: WindowCounter,
    hour: WindowCounter,
    day: WindowCounter,
    total_requests: u64,
    violations: u64,
    first_request_time: u64,
    last_request_time: u64,
}

impl UsageRecord {
    fn new(now: u64) -> Self {
        Self {
            minute: WindowCounter::new(now),
            hour: WindowCounter::new(now),
            day: WindowCounter::new(now),
            total_requests: 0,
            violations: 0,
            first_request_time: now,
            last_request_time: now,
        }
    }

    pub(crate) fn counter(&self, kind: WindowKind) -> &WindowCounter {
        match kind {
            WindowKind::Minute => &self.minute,
            WindowKind::Hour => &self.hour,
            WindowKind::Day => &self.day,
        }
    }

    fn counter_mut(&mut self, kind: WindowKind) -> &mut WindowCounter {
        match kind {
            WindowKind::Minute => &mut self.minute,
            WindowKind::Hour => &mut self.hour,
            WindowKind::Day => &mut self.day,
        }
    }

    /// Reset every elapsed window.
    pub(crate) fn roll_windows(&mut self, now: u64) {
        for kind in WindowKind::ORDERED {
            self.counter_mut(kind).roll(kind, now);
        }
    }

    /// First enforced window whose count has reached its limit, scanned
    /// minute -> hour -> day. All enforced windows must pass for admission.
    pub(crate) fn first_violation(&self, policy: &QuotaPolicy) -> Option<WindowKind> {
        WindowKind::ORDERED.into_iter().find(|&kind| {
            policy
                .limit_for(kind)
                .is_some_and(|limit| self.counter(kind).count >= limit)
        })
    }

    /// Count an admitted request against every enforced window.
    pub(crate) fn record_admission(&mut self, policy: &QuotaPolicy, now: u64) {
        for kind in WindowKind::ORDERED {
            if let Some(limit) = policy.limit_for(kind) {
                let counter = self.counter_mut(kind);
                counter.count += 1;
                if counter.count > limit {
                    // Counts are only mutated under the shard lock, so this
                    // indicates a reset or locking bug, not load.
                    let violation = RateLimitError::new(RateLimitErrorKind::InvariantViolation(
                        format!(
                            "{kind} window count {} exceeds limit {limit}",
                            counter.count
                        ),
                    ));
                    error!(%violation, "admission accounting corrupted");
                }
            }
        }
        self.total_requests += 1;
        self.last_request_time = now;
    }

    /// Count a rejected request.
    pub(crate) fn record_violation(&mut self) {
        self.violations += 1;
    }

    pub(crate) fn total_requests(&self) -> u64 {
        self.total_requests
    }

    pub(crate) fn violations(&self) -> u64 {
        self.violations
    }

    pub(crate) fn first_request_time(&self) -> u64 {
        self.first_request_time
    }

    pub(crate) fn last_request_time(&self) -> u64 {
        self.last_request_time
    }
}

/// Sharded per-client usage map.
///
/// All counter mutation flows through `with_record` under the owning shard
/// lock; readers (stats, eviction) take the same locks one shard at a time,
/// so the admission path never waits behind a whole-map operation.
#[derive(Debug)]
pub(crate) struct UsageStore {
    shards: Vec<Mutex<HashMap<String, UsageRecord>>>,
}

impl UsageStore {
    pub(crate) fn new() -> Self {
        Self {
            shards: (0..SHARD_COUNT).map(|_| Mutex::new(HashMap::new())).collect(),
        }
    }

    fn shard(&self, identity: &str) -> &Mutex<HashMap<String, UsageRecord>> {
        let mut hasher = DefaultHasher::new();
        identity.hash(&mut hasher);
        &self.shards[hasher.finish() as usize % SHARD_COUNT]
    }

    /// Run `f` with exclusive access to the identity's record, creating the
    /// record on first use. The whole admission decision happens inside this
    /// critical section.
    pub(crate) fn with_record<R>(
        &self,
        identity: &ClientIdentity,
        now: u64,
        f: impl FnOnce(&mut UsageRecord) -> R,
    ) -> R {
        let mut shard = self
            .shard(identity.as_str())
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let record = shard
            .entry(identity.as_str().to_string())
            .or_insert_with(|| UsageRecord::new(now));
        f(record)
    }

    /// Snapshot of one client's record, if present.
    pub(crate) fn get(&self, identity: &ClientIdentity) -> Option<UsageRecord> {
        let shard = self
            .shard(identity.as_str())
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        shard.get(identity.as_str()).cloned()
    }

    /// Fold over a snapshot of every record, locking one shard at a time.
    pub(crate) fn fold_records<A>(&self, init: A, mut f: impl FnMut(A, &UsageRecord) -> A) -> A {
        let mut acc = init;
        for shard in &self.shards {
            let shard = shard.lock().unwrap_or_else(PoisonError::into_inner);
            for record in shard.values() {
                acc = f(acc, record);
            }
        }
        acc
    }

    /// Remove records idle longer than `idle_threshold_secs`. Returns the
    /// number of evicted records.
    pub(crate) fn evict_idle(&self, now: u64, idle_threshold_secs: u64) -> usize {
        let mut removed = 0;
        for shard in &self.shards {
            let mut shard = shard.lock().unwrap_or_else(PoisonError::into_inner);
            let before = shard.len();
            shard.retain(|_, record| {
                now.saturating_sub(record.last_request_time) <= idle_threshold_secs
            });
            removed += before - shard.len();
        }
        removed
    }

    /// Number of tracked clients.
    pub(crate) fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.lock().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
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

    #[test]
    fn test_window_rolls_only_after_duration() {
        let mut counter = WindowCounter::new(1000);
        counter.count = 5;

        counter.roll(WindowKind::Minute, 1059);
        assert_eq!(counter.count(), 5);
        assert_eq!(counter.window_start(), 1000);

        counter.roll(WindowKind::Minute, 1060);
        assert_eq!(counter.count(), 0);
        assert_eq!(counter.window_start(), 1060);
    }

    #[test]
    fn test_seconds_until_reset_floors_at_one() {
        let counter = WindowCounter::new(1000);
        assert_eq!(counter.seconds_until_reset(WindowKind::Hour, 1000), 3600);
        assert_eq!(counter.seconds_until_reset(WindowKind::Hour, 4599), 1);
        assert_eq!(counter.seconds_until_reset(WindowKind::Hour, 4600), 1);
    }

    #[test]
    fn test_first_violation_scans_tightest_window_first() {
        let mut record = UsageRecord::new(0);
        let policy = policy(100, Some(2), None);

        record.record_admission(&policy, 0);
        record.record_admission(&policy, 1);

        // Minute window full, hour window far from full.
        assert_eq!(record.first_violation(&policy), Some(WindowKind::Minute));
    }

    #[test]
    fn test_unenforced_windows_are_ignored() {
        let mut record = UsageRecord::new(0);
        let policy = policy(2, None, None);

        record.record_admission(&policy, 0);
        record.record_admission(&policy, 0);

        assert_eq!(record.first_violation(&policy), Some(WindowKind::Hour));
        // The minute counter was never incremented.
        assert_eq!(record.counter(WindowKind::Minute).count(), 0);
    }

    #[test]
    fn test_evict_idle_keeps_active_records() {
        let store = UsageStore::new();
        let active = ClientIdentity::from_api_key("active");
        let idle = ClientIdentity::from_api_key("idle");
        let policy = policy(100, None, None);

        store.with_record(&idle, 0, |r| r.record_admission(&policy, 0));
        store.with_record(&active, 90_000, |r| r.record_admission(&policy, 90_000));

        let removed = store.evict_idle(90_000, 86_400);
        assert_eq!(removed, 1);
        assert!(store.get(&idle).is_none());
        assert!(store.get(&active).is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_record_created_lazily_with_all_windows_at_now() {
        let store = UsageStore::new();
        let identity = ClientIdentity::from_api_key("fresh");
        store.with_record(&identity, 5000, |record| {
            for kind in WindowKind::ORDERED {
                assert_eq!(record.counter(kind).window_start(), 5000);
                assert_eq!(record.counter(kind).count(), 0);
            }
        });
    }
}
