use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use validator::Validate;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_GATEWAY_STATUS: &str = "enabled";
const DEFAULT_RETRY_AFTER_SECS: u64 = 30;
const DEFAULT_SESSION_TTL_SECS: u64 = 3600;
const DEFAULT_MAX_AVAILABILITY_ITEMS: usize = 50;
const DEFAULT_CURRENCY: &str = "TWD";
const CONFIG_DIR: &str = "config";

/// Application configuration, loaded from `config/default.toml` (optional)
/// with `UCP__`-prefixed environment overrides.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    #[serde(default = "default_host")]
    #[validate(length(min = 1))]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    #[serde(default)]
    #[validate]
    pub gateway: GatewayConfig,
}

/// Gateway-specific knobs, including the process-wide kill switch.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct GatewayConfig {
    /// Kill switch sentinel. The gateway serves traffic unless this is the
    /// literal string `disabled`; absence or any other value means enabled.
    /// Intentional fail-open for availability.
    #[serde(default = "default_gateway_status")]
    pub status: String,

    /// `Retry-After` hint attached to kill-switch responses, in seconds.
    #[serde(default = "default_retry_after_secs")]
    #[validate(range(min = 1))]
    pub retry_after_secs: u64,

    #[serde(default = "default_session_ttl_secs")]
    #[validate(range(min = 1))]
    pub session_ttl_secs: u64,

    /// Maximum offers per availability query.
    #[serde(default = "default_max_availability_items")]
    #[validate(range(min = 1))]
    pub max_availability_items: usize,

    /// Merchant currency used by the in-memory collaborators. ISO 4217.
    #[serde(default = "default_currency")]
    #[validate(length(equal = 3))]
    pub currency: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            status: default_gateway_status(),
            retry_after_secs: default_retry_after_secs(),
            session_ttl_secs: default_session_ttl_secs(),
            max_availability_items: default_max_availability_items(),
            currency: default_currency(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_json: false,
            gateway: GatewayConfig::default(),
        }
    }
}

pub fn load_config() -> Result<AppConfig, ConfigError> {
    let config: AppConfig = Config::builder()
        .add_source(File::with_name(&format!("{CONFIG_DIR}/default")).required(false))
        .add_source(Environment::with_prefix("UCP").separator("__"))
        .build()?
        .try_deserialize()?;
    config
        .validate()
        .map_err(|e| ConfigError::Message(format!("invalid configuration: {e}")))?;
    Ok(config)
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_gateway_status() -> String {
    DEFAULT_GATEWAY_STATUS.to_string()
}
fn default_retry_after_secs() -> u64 {
    DEFAULT_RETRY_AFTER_SECS
}
fn default_session_ttl_secs() -> u64 {
    DEFAULT_SESSION_TTL_SECS
}
fn default_max_availability_items() -> usize {
    DEFAULT_MAX_AVAILABILITY_ITEMS
}
fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = AppConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.gateway.status, "enabled");
        assert_eq!(config.gateway.max_availability_items, 50);
        assert_eq!(config.gateway.currency, "TWD");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validation_rejects_malformed_values() {
        let mut config = AppConfig::default();
        config.gateway.currency = "NTD$".into();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.gateway.max_availability_items = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.host = String::new();
        assert!(config.validate().is_err());
    }
}
