//! TOML-backed configuration for the admission-control engine.
//!
//! Configuration is loaded with a precedence system:
//! - Bundled defaults (include_str! from lexgate.toml)
//! - User overrides (./lexgate.toml or ~/.config/lexgate/lexgate.toml)
//! - Automatic merging with user values taking precedence

use crate::{ClientTier, PolicyResolver, QuotaPolicy, ReaperConfig, TierPolicies, TierRegistry};
use config::{Config, File, FileFormat};
use lexgate_error::{ConfigError, LexgateError, LexgateResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, instrument};

/// Raw API keys granting elevated tiers.
///
/// Keys listed here are hashed into identity form when the tier registry is
/// built; the raw values never leave the configuration layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct KeyConfig {
    /// Keys classified as `Admin`.
    #[serde(default)]
    pub admin: Vec<String>,

    /// Keys classified as `Premium`.
    #[serde(default)]
    pub premium: Vec<String>,
}

/// Settings for the HTTP listener.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerSettings {
    /// Socket address to bind, e.g. "127.0.0.1:8080".
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Log level filter, e.g. "info" or "debug".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON-formatted logs for production.
    #[serde(default)]
    pub json_logs: bool,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

/// Top-level lexgate configuration.
///
/// # Example
///
/// ```no_run
/// use lexgate_rate_limit::LexgateConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // Load configuration (bundled defaults + user overrides)
/// let config = LexgateConfig::load()?;
///
/// let tiers = config.tier_policies()?;
/// println!("default hourly limit: {}", tiers.default.requests_per_hour);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LexgateConfig {
    /// Tier name to default quota policy. All four tiers must be present.
    #[serde(default)]
    pub tiers: HashMap<String, QuotaPolicy>,

    /// Route to endpoint override policy.
    #[serde(default)]
    pub endpoints: HashMap<String, QuotaPolicy>,

    /// Key sets granting elevated tiers.
    #[serde(default)]
    pub keys: KeyConfig,

    /// Idle eviction settings.
    #[serde(default)]
    pub reaper: ReaperConfig,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSettings,
}

impl LexgateConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// resulting configuration is invalid.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> LexgateResult<Self> {
        debug!("Loading configuration from file");

        let config: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                LexgateError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                LexgateError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with precedence: user override > bundled default.
    ///
    /// Configuration sources in order of precedence (later sources override
    /// earlier):
    /// 1. Bundled defaults (lexgate.toml shipped with the library)
    /// 2. User config in home directory (~/.config/lexgate/lexgate.toml)
    /// 3. User config in current directory (./lexgate.toml)
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> LexgateResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        // Bundled default configuration
        const DEFAULT_CONFIG: &str = include_str!("../../../lexgate.toml");

        let mut builder = Config::builder()
            // Start with bundled defaults
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        // Add user config from home directory (optional)
        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/lexgate/lexgate.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        // Add user config from current directory (optional, highest precedence)
        builder = builder.add_source(File::with_name("lexgate").required(false));

        let config: Self = builder
            .build()
            .map_err(|e| {
                LexgateError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                LexgateError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Check that the tier table is complete and every policy is usable.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown tier names, missing tiers, or policies
    /// with zero limits.
    pub fn validate(&self) -> LexgateResult<()> {
        let tiers = self.tier_policies()?;
        PolicyResolver::new(tiers, self.endpoints.clone())
            .map_err(|e| LexgateError::from(ConfigError::new(e.to_string())))?;
        Ok(())
    }

    /// The per-tier policy table.
    ///
    /// # Errors
    ///
    /// Returns an error if a tier key is not a known tier name or any of the
    /// four tiers is missing.
    pub fn tier_policies(&self) -> LexgateResult<TierPolicies> {
        for key in self.tiers.keys() {
            ClientTier::from_str(key).map_err(|_| {
                LexgateError::from(ConfigError::new(format!("Unknown tier name: {}", key)))
            })?;
        }

        let lookup = |tier: ClientTier| -> LexgateResult<QuotaPolicy> {
            self.tiers.get(&tier.to_string()).copied().ok_or_else(|| {
                LexgateError::from(ConfigError::new(format!(
                    "Missing policy for tier: {}",
                    tier
                )))
            })
        };

        Ok(TierPolicies {
            default: lookup(ClientTier::Default)?,
            authenticated: lookup(ClientTier::Authenticated)?,
            premium: lookup(ClientTier::Premium)?,
            admin: lookup(ClientTier::Admin)?,
        })
    }

    /// Build the tier registry from the configured key sets.
    pub fn tier_registry(&self) -> TierRegistry {
        TierRegistry::new(&self.keys.admin, &self.keys.premium)
    }

    /// Build the policy resolver from the configured tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn policy_resolver(&self) -> LexgateResult<PolicyResolver> {
        let tiers = self.tier_policies()?;
        PolicyResolver::new(tiers, self.endpoints.clone())
            .map_err(|e| LexgateError::from(ConfigError::new(e.to_string())))
    }
}
