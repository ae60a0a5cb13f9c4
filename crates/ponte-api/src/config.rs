//! Configuration management for the order relay.

use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use ponte_forward::ClientConfig;
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.toml";

/// Complete service configuration with defaults, file, and environment
/// overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`config.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// The relay runs without a config file; the only value a deployment must
/// supply is `VENDUS_API_KEY`, and even its absence is a logged
/// per-request configuration error rather than a startup failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server
    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host", alias = "HOST")]
    pub host: String,
    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port", alias = "PORT")]
    pub port: u16,
    /// Inbound HTTP request timeout in seconds.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout", alias = "REQUEST_TIMEOUT")]
    pub request_timeout: u64,
    /// Maximum inbound body size in bytes.
    ///
    /// Environment variable: `MAX_BODY_BYTES`
    #[serde(default = "default_max_body_bytes", alias = "MAX_BODY_BYTES")]
    pub max_body_bytes: usize,

    // Forwarding
    /// Invoicing API credential.
    ///
    /// Environment variable: `VENDUS_API_KEY`
    #[serde(default, alias = "VENDUS_API_KEY")]
    pub vendus_api_key: Option<String>,
    /// Invoicing API documents endpoint.
    ///
    /// Environment variable: `VENDUS_DOCUMENTS_URL`
    #[serde(default = "default_documents_url", alias = "VENDUS_DOCUMENTS_URL")]
    pub vendus_documents_url: String,
    /// Document type code sent with every invoice.
    ///
    /// Environment variable: `INVOICE_TYPE`
    #[serde(default = "default_invoice_type", alias = "INVOICE_TYPE")]
    pub invoice_type: String,
    /// Outbound request timeout in seconds.
    ///
    /// Environment variable: `FORWARD_TIMEOUT_SECONDS`
    #[serde(default = "default_forward_timeout", alias = "FORWARD_TIMEOUT_SECONDS")]
    pub forward_timeout_seconds: u64,

    // Sender verification
    /// Whether the shared-secret sender check is enforced.
    ///
    /// Environment variable: `SENDER_VERIFICATION`
    #[serde(default, alias = "SENDER_VERIFICATION")]
    pub sender_verification: bool,
    /// Expected shared master key for the sender check.
    ///
    /// Environment variable: `GLORIA_MASTER_KEY`
    #[serde(default, alias = "GLORIA_MASTER_KEY")]
    pub gloria_master_key: Option<String>,
    /// Expected restaurant token for the sender check.
    ///
    /// Environment variable: `GLORIA_RESTAURANT_TOKEN`
    #[serde(default, alias = "GLORIA_RESTAURANT_TOKEN")]
    pub gloria_restaurant_token: Option<String>,

    // Logging
    /// Log level configuration.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG")]
    pub rust_log: String,
}

impl Config {
    /// Load configuration from defaults, config file, and environment
    /// variable overrides.
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(""));

        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Convert to the forwarding client's configuration.
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig {
            documents_url: self.vendus_documents_url.clone(),
            timeout: Duration::from_secs(self.forward_timeout_seconds),
            ..ClientConfig::default()
        }
    }

    /// Parse the server socket address from host and port.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Returns the invoicing credential masked for logging.
    pub fn masked_api_key(&self) -> String {
        match self.vendus_api_key.as_deref() {
            Some(key) if key.len() > 4 => format!("{}***", &key[..4]),
            Some(_) => "***".to_string(),
            None => "unset".to_string(),
        }
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.max_body_bytes == 0 {
            anyhow::bail!("max_body_bytes must be greater than 0");
        }

        if self.request_timeout == 0 {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.forward_timeout_seconds == 0 {
            anyhow::bail!("forward_timeout_seconds must be greater than 0");
        }

        if self.invoice_type.trim().is_empty() {
            anyhow::bail!("invoice_type must not be empty");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
            vendus_api_key: None,
            vendus_documents_url: default_documents_url(),
            invoice_type: default_invoice_type(),
            forward_timeout_seconds: default_forward_timeout(),
            sender_verification: false,
            gloria_master_key: None,
            gloria_restaurant_token: None,
            rust_log: default_log_level(),
        }
    }
}

fn default_host() -> String {
    // The webhook sender is external; bind all interfaces.
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_documents_url() -> String {
    ponte_forward::client::DEFAULT_DOCUMENTS_URL.to_string()
}

fn default_invoice_type() -> String {
    "FT".to_string()
}

fn default_forward_timeout() -> u64 {
    15
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, env, sync::Mutex};

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct TestEnvGuard {
        _lock: std::sync::MutexGuard<'static, ()>,
        vars: Vec<String>,
        originals: HashMap<String, Option<String>>,
    }

    impl TestEnvGuard {
        fn new() -> Self {
            let lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            Self { _lock: lock, vars: Vec::new(), originals: HashMap::new() }
        }

        fn set_var(&mut self, key: &str, value: &str) {
            if !self.vars.contains(&key.to_string()) {
                self.originals.insert(key.to_string(), env::var(key).ok());
                self.vars.push(key.to_string());
            }
            env::set_var(key, value);
        }
    }

    impl Drop for TestEnvGuard {
        fn drop(&mut self) {
            for var in &self.vars {
                match self.originals.get(var) {
                    Some(Some(value)) => env::set_var(var, value),
                    Some(None) => env::remove_var(var),
                    None => {},
                }
            }
        }
    }

    #[test]
    fn defaults_are_valid_and_match_the_contract() {
        let config = Config::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_body_bytes, 1024 * 1024);
        assert_eq!(config.forward_timeout_seconds, 15);
        assert_eq!(config.invoice_type, "FT");
        assert!(config.vendus_api_key.is_none());
        assert!(!config.sender_verification);
    }

    #[test]
    fn env_overrides_take_priority() {
        let mut guard = TestEnvGuard::new();
        guard.set_var("PORT", "9090");
        guard.set_var("VENDUS_API_KEY", "env-key");
        guard.set_var("FORWARD_TIMEOUT_SECONDS", "20");
        guard.set_var("SENDER_VERIFICATION", "true");
        guard.set_var("GLORIA_MASTER_KEY", "master");
        guard.set_var("GLORIA_RESTAURANT_TOKEN", "token");

        let config = Config::load().expect("config should load with env overrides");

        assert_eq!(config.port, 9090);
        assert_eq!(config.vendus_api_key.as_deref(), Some("env-key"));
        assert_eq!(config.forward_timeout_seconds, 20);
        assert!(config.sender_verification);
        assert_eq!(config.gloria_master_key.as_deref(), Some("master"));
        assert_eq!(config.gloria_restaurant_token.as_deref(), Some("token"));
    }

    #[test]
    fn invalid_values_fail_validation() {
        let mut config = Config::default();
        config.port = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.max_body_bytes = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.invoice_type = "  ".to_string();
        assert!(config.validate().is_err());

        config = Config::default();
        config.forward_timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn api_key_is_masked_for_logging() {
        let mut config = Config::default();
        assert_eq!(config.masked_api_key(), "unset");

        config.vendus_api_key = Some("abcd1234secret".to_string());
        let masked = config.masked_api_key();
        assert!(masked.starts_with("abcd"));
        assert!(!masked.contains("secret"));

        config.vendus_api_key = Some("ab".to_string());
        assert_eq!(config.masked_api_key(), "***");
    }

    #[test]
    fn socket_address_parsing() {
        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 9000;

        let addr = config.parse_server_addr().expect("should parse socket address");

        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 9000);
    }

    #[test]
    fn client_config_conversion_carries_timeout_and_url() {
        let mut config = Config::default();
        config.vendus_documents_url = "http://localhost:9999/docs".to_string();
        config.forward_timeout_seconds = 7;

        let client_config = config.to_client_config();

        assert_eq!(client_config.documents_url, "http://localhost:9999/docs");
        assert_eq!(client_config.timeout, Duration::from_secs(7));
    }
}
