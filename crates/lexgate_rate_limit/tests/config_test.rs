//! Tests for the configuration system.

use lexgate_rate_limit::{ClientIdentity, ClientTier, LexgateConfig, RateLimiter};
use std::io::Write;
use tempfile::Builder;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
    write!(temp_file, "{}", contents).unwrap();
    temp_file
}

const COMPLETE_CONFIG: &str = r#"
[tiers.default]
requests_per_hour = 10
requests_per_minute = 2

[tiers.authenticated]
requests_per_hour = 100

[tiers.premium]
requests_per_hour = 500

[tiers.admin]
requests_per_hour = 1000

[endpoints."/api/v1/heavy"]
requests_per_hour = 5

[keys]
admin = ["root-key"]
premium = ["paid-key"]

[reaper]
idle_threshold_secs = 3600
sweep_interval_secs = 60
"#;

#[test]
fn test_load_bundled_defaults() {
    let config = LexgateConfig::load().unwrap();

    let tiers = config.tier_policies().unwrap();
    assert_eq!(tiers.default.requests_per_hour, 100);
    assert_eq!(tiers.default.requests_per_minute, Some(10));
    assert_eq!(tiers.default.requests_per_day, Some(500));
    assert_eq!(tiers.default.burst_allowance, 10);

    assert_eq!(tiers.authenticated.requests_per_hour, 1000);
    assert_eq!(tiers.premium.requests_per_hour, 5000);
    assert_eq!(tiers.admin.requests_per_hour, 10000);

    // Bundled endpoint overrides for the expensive analysis routes.
    let constitutional = &config.endpoints["/api/v1/analysis/constitutional"];
    assert_eq!(constitutional.requests_per_hour, 50);
    assert_eq!(constitutional.requests_per_minute, Some(5));

    assert_eq!(config.reaper.idle_threshold_secs, 86_400);
    assert_eq!(config.reaper.sweep_interval_secs, 300);
}

#[test]
fn test_config_from_file() {
    let temp_file = write_config(COMPLETE_CONFIG);
    let config = LexgateConfig::from_file(temp_file.path()).unwrap();

    let tiers = config.tier_policies().unwrap();
    assert_eq!(tiers.default.requests_per_hour, 10);
    assert_eq!(tiers.default.requests_per_minute, Some(2));
    assert_eq!(tiers.default.requests_per_day, None);
    // Unspecified burst falls back to its default.
    assert_eq!(tiers.default.burst_allowance, 10);

    assert_eq!(config.reaper.idle_threshold_secs, 3600);
    assert_eq!(config.endpoints["/api/v1/heavy"].requests_per_hour, 5);
}

#[test]
fn test_missing_tier_is_rejected() {
    let temp_file = write_config(
        r#"
[tiers.default]
requests_per_hour = 10
"#,
    );
    let err = LexgateConfig::from_file(temp_file.path()).unwrap_err();
    assert!(format!("{}", err).contains("Missing policy for tier"));
}

#[test]
fn test_unknown_tier_name_is_rejected() {
    let mut contents = COMPLETE_CONFIG.to_string();
    contents.push_str("\n[tiers.platinum]\nrequests_per_hour = 9999\n");
    let temp_file = write_config(&contents);

    let err = LexgateConfig::from_file(temp_file.path()).unwrap_err();
    assert!(format!("{}", err).contains("Unknown tier name"));
}

#[test]
fn test_zero_limit_is_rejected() {
    let contents = COMPLETE_CONFIG.replace(
        "[endpoints.\"/api/v1/heavy\"]\nrequests_per_hour = 5",
        "[endpoints.\"/api/v1/heavy\"]\nrequests_per_hour = 0",
    );
    let temp_file = write_config(&contents);

    let err = LexgateConfig::from_file(temp_file.path()).unwrap_err();
    assert!(format!("{}", err).contains("requests_per_hour must be at least 1"));
}

#[test]
fn test_configured_keys_drive_classification() {
    let temp_file = write_config(COMPLETE_CONFIG);
    let config = LexgateConfig::from_file(temp_file.path()).unwrap();
    let limiter = RateLimiter::from_config(&config).unwrap();

    assert_eq!(
        limiter.classify(&ClientIdentity::from_api_key("root-key")),
        ClientTier::Admin
    );
    assert_eq!(
        limiter.classify(&ClientIdentity::from_api_key("paid-key")),
        ClientTier::Premium
    );
    assert_eq!(
        limiter.classify(&ClientIdentity::from_api_key("anybody-else")),
        ClientTier::Authenticated
    );
}

#[test]
fn test_endpoint_override_binds_effective_policy() {
    let temp_file = write_config(COMPLETE_CONFIG);
    let config = LexgateConfig::from_file(temp_file.path()).unwrap();
    let limiter = RateLimiter::from_config(&config).unwrap();

    // Authenticated tier allows 100/hour, but the endpoint override caps the
    // effective policy at 5/hour.
    let identity = ClientIdentity::from_api_key("some-key");
    let decision = limiter.check_at(&identity, "/api/v1/heavy", 1_700_000_000);
    assert!(decision.allowed);
    assert_eq!(decision.limit, 5);
    assert_eq!(decision.policy, "5 per hour");
    assert_eq!(decision.tier, ClientTier::Authenticated);

    // A route without an override gets the plain tier policy.
    let plain = limiter.check_at(&identity, "/api/v1/other", 1_700_000_000);
    assert_eq!(plain.limit, 100);
}

#[test]
fn test_server_settings_defaults() {
    let temp_file = write_config(COMPLETE_CONFIG);
    let config = LexgateConfig::from_file(temp_file.path()).unwrap();

    assert_eq!(config.server.bind, "127.0.0.1:8080");
    assert_eq!(config.server.log_level, "info");
    assert!(!config.server.json_logs);
}
