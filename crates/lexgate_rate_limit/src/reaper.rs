//! Background eviction of idle client records.

use crate::RateLimiter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Settings for the idle-record reaper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReaperConfig {
    /// Records idle longer than this many seconds are evicted.
    #[serde(default = "default_idle_threshold")]
    pub idle_threshold_secs: u64,

    /// Seconds between sweeps.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_idle_threshold() -> u64 {
    86_400
}

fn default_sweep_interval() -> u64 {
    300
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            idle_threshold_secs: default_idle_threshold(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

/// Periodically evicts idle client records to bound memory.
///
/// Sweeps take the same shard locks as the admission path, one shard at a
/// time, and run on their own interval rather than being triggered by
/// requests.
#[derive(Debug, Clone)]
pub struct Reaper {
    limiter: Arc<RateLimiter>,
    config: ReaperConfig,
}

impl Reaper {
    /// Create a reaper over the given engine.
    pub fn new(limiter: Arc<RateLimiter>, config: ReaperConfig) -> Self {
        Self { limiter, config }
    }

    /// Run one sweep immediately. Returns the eviction count.
    pub fn sweep(&self) -> usize {
        let removed = self.limiter.evict_idle(self.config.idle_threshold_secs);
        if removed > 0 {
            info!(removed, "evicted idle client records");
        } else {
            debug!("reaper sweep found no idle records");
        }
        removed
    }

    /// Spawn the periodic sweep task on the current tokio runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        let period = Duration::from_secs(self.config.sweep_interval_secs.max(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                self.sweep();
            }
        })
    }
}
