//! Race-freedom tests: the admitted count can never exceed the limit.

use lexgate_rate_limit::{
    ClientIdentity, PolicyResolver, QuotaPolicy, RateLimiter, TierPolicies, TierRegistry,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

fn limiter(hourly_limit: u32) -> RateLimiter {
    let policy = QuotaPolicy {
        requests_per_hour: hourly_limit,
        requests_per_minute: None,
        requests_per_day: None,
        burst_allowance: 10,
    };
    let tiers = TierPolicies {
        default: policy,
        authenticated: policy,
        premium: policy,
        admin: policy,
    };
    let resolver = PolicyResolver::new(tiers, HashMap::new()).unwrap();
    RateLimiter::new(TierRegistry::default(), resolver)
}

#[test]
fn test_concurrent_checks_admit_exactly_the_limit() {
    const LIMIT: u32 = 5;
    const CALLERS: usize = 32;

    let limiter = Arc::new(limiter(LIMIT));
    let identity = ClientIdentity::from_api_key("contended");
    let admitted = Arc::new(AtomicUsize::new(0));
    let rejected = Arc::new(AtomicUsize::new(0));
    let now = 1_700_000_000;

    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let limiter = Arc::clone(&limiter);
            let identity = identity.clone();
            let admitted = Arc::clone(&admitted);
            let rejected = Arc::clone(&rejected);
            thread::spawn(move || {
                let decision = limiter.check_at(&identity, "/r", now);
                if decision.allowed {
                    admitted.fetch_add(1, Ordering::SeqCst);
                } else {
                    rejected.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(admitted.load(Ordering::SeqCst), LIMIT as usize);
    assert_eq!(rejected.load(Ordering::SeqCst), CALLERS - LIMIT as usize);

    // The record agrees with the instrumented counters.
    let snapshot = limiter.usage(&identity);
    assert_eq!(snapshot.total_requests, LIMIT as u64);
    assert_eq!(snapshot.violations, (CALLERS - LIMIT as usize) as u64);
}

#[test]
fn test_concurrent_checks_across_distinct_clients_do_not_interfere() {
    const CLIENTS: usize = 24;

    let limiter = Arc::new(limiter(1));
    let now = 1_700_000_000;

    let handles: Vec<_> = (0..CLIENTS)
        .map(|i| {
            let limiter = Arc::clone(&limiter);
            thread::spawn(move || {
                let identity = ClientIdentity::from_api_key(&format!("client-{i}"));
                limiter.check_at(&identity, "/r", now).allowed
            })
        })
        .collect();

    // Every client gets its first request through regardless of interleaving.
    for handle in handles {
        assert!(handle.join().unwrap());
    }
    assert_eq!(limiter.stats_at(now).total_clients, CLIENTS);
}
