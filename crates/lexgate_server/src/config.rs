//! Configuration for the lexgate HTTP server.

use derive_builder::Builder;
use lexgate_rate_limit::ServerSettings;

/// Runtime configuration for the HTTP listener.
///
/// # Example
///
/// ```
/// use lexgate_server::ServerConfigBuilder;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ServerConfigBuilder::default()
///     .bind("0.0.0.0:9000")
///     .build()?;
/// assert_eq!(config.bind, "0.0.0.0:9000");
/// assert_eq!(config.log_level, "info");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(setter(into))]
pub struct ServerConfig {
    /// Socket address to bind, e.g. "127.0.0.1:8080".
    #[builder(default = "String::from(\"127.0.0.1:8080\")")]
    pub bind: String,

    /// Log level filter, e.g. "info" or "debug".
    #[builder(default = "String::from(\"info\")")]
    pub log_level: String,

    /// Emit JSON-formatted logs for production.
    #[builder(default)]
    pub json_logs: bool,
}

impl ServerConfig {
    /// Build from the `[server]` section of the engine configuration.
    pub fn from_settings(settings: &ServerSettings) -> Self {
        Self {
            bind: settings.bind.clone(),
            log_level: settings.log_level.clone(),
            json_logs: settings.json_logs,
        }
    }
}
