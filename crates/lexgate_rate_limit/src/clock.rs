//! Clock adapters for time operations.
//!
//! Quota windows are anchored to wall-clock epochs because reset times are
//! reported to clients in `X-RateLimit-Reset`, so the clock trait works in
//! whole seconds since the Unix epoch rather than `Instant`.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current time in whole seconds since the Unix epoch.
pub trait Clock: std::fmt::Debug + Send + Sync {
    /// Current time in seconds since the Unix epoch.
    fn now_epoch(&self) -> u64;
}

/// System clock implementation using `SystemTime::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now_epoch(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Controllable clock for tests.
///
/// Allows tests to drive time explicitly, enabling deterministic testing of
/// window resets and idle eviction. Clones share the same underlying time
/// value, so advancing one clone is visible to all of them.
///
/// # Examples
///
/// ```
/// use lexgate_rate_limit::{Clock, ManualClock};
///
/// let clock = ManualClock::new(1_700_000_000);
/// assert_eq!(clock.now_epoch(), 1_700_000_000);
///
/// clock.advance(3600);
/// assert_eq!(clock.now_epoch(), 1_700_003_600);
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<Mutex<u64>>,
}

impl ManualClock {
    /// Create a manual clock starting at the given epoch second.
    pub fn new(start_epoch: u64) -> Self {
        Self {
            current: Arc::new(Mutex::new(start_epoch)),
        }
    }

    /// Advance the clock by `secs` seconds.
    pub fn advance(&self, secs: u64) {
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *current += secs;
    }

    /// Set the clock to a specific epoch second.
    pub fn set(&self, epoch: u64) {
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *current = epoch;
    }
}

impl Clock for ManualClock {
    fn now_epoch(&self) -> u64 {
        *self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_monotonic_enough() {
        let clock = SystemClock::new();
        let t1 = clock.now_epoch();
        let t2 = clock.now_epoch();
        assert!(t2 >= t1);
        assert!(t1 > 1_600_000_000);
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new(100);
        let other = clock.clone();
        other.advance(50);
        assert_eq!(clock.now_epoch(), 150);

        clock.set(10);
        assert_eq!(other.now_epoch(), 10);
    }
}
