/*
[INPUT]:  YAML configuration file, BITSTAMP_* environment variables
[OUTPUT]: Client, WebSocket and credential settings for the CLI
[POS]:    Configuration layer - CLI setup
[UPDATE]: When adding new configuration options
*/

use std::time::Duration;

use anyhow::{Context, bail};
use bitstamp_adapter::auth::{API_KEY_ENV, API_SECRET_ENV, CLIENT_ID_ENV};
use bitstamp_adapter::http::DEFAULT_BASE_URL;
use bitstamp_adapter::ws::DEFAULT_WS_URL;
use bitstamp_adapter::{BitstampClient, ClientConfig, Credentials, WsConfig};
use serde::{Deserialize, Serialize};

/// Top-level configuration for the CLI
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BitstampConfig {
    #[serde(default)]
    pub rest: RestConfig,
    #[serde(default)]
    pub ws: StreamConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

/// REST endpoint settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RestConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// WebSocket endpoint settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamConfig {
    #[serde(default = "default_ws_url")]
    pub url: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: default_ws_url(),
        }
    }
}

/// API credentials; every part is optional and falls back to the environment
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_secret: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_ws_url() -> String {
    DEFAULT_WS_URL.to_string()
}

impl BitstampConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        // An empty file is a valid "all defaults" config.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Check settings without touching the network
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.rest.timeout_secs == 0 {
            bail!("rest.timeout_secs must be greater than zero");
        }
        if self.rest.connect_timeout_secs == 0 {
            bail!("rest.connect_timeout_secs must be greater than zero");
        }
        BitstampClient::with_config(self.client_config()).context("invalid rest settings")?;

        let ws_url = self.ws.url.as_str();
        if !(ws_url.starts_with("ws://") || ws_url.starts_with("wss://")) {
            bail!("ws.url must use ws:// or wss://, got {ws_url}");
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.rest.base_url.clone(),
            timeout: Duration::from_secs(self.rest.timeout_secs),
            connect_timeout: Duration::from_secs(self.rest.connect_timeout_secs),
        }
    }

    pub fn ws_config(&self) -> WsConfig {
        WsConfig {
            url: self.ws.url.clone(),
        }
    }

    /// Resolve credentials from the file, falling back to `BITSTAMP_*` variables
    pub fn credentials(&self) -> anyhow::Result<Credentials> {
        self.credentials_with(|name| std::env::var(name).ok())
    }

    fn credentials_with(&self, env: impl Fn(&str) -> Option<String>) -> anyhow::Result<Credentials> {
        let pick = |configured: &Option<String>, name: &str| {
            configured
                .clone()
                .filter(|value| !value.is_empty())
                .or_else(|| env(name))
        };

        let credentials = Credentials::from_parts(
            pick(&self.credentials.client_id, CLIENT_ID_ENV),
            pick(&self.credentials.api_key, API_KEY_ENV),
            pick(&self.credentials.api_secret, API_SECRET_ENV).map(String::into_bytes),
        )?;
        Ok(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_apply_to_missing_sections() {
        let config = BitstampConfig::from_yaml("rest:\n  timeout_secs: 5\n").expect("parse");
        assert_eq!(config.rest.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.rest.timeout_secs, 5);
        assert_eq!(config.rest.connect_timeout_secs, 10);
        assert_eq!(config.ws.url, DEFAULT_WS_URL);
        assert!(config.credentials.api_key.is_none());
        config.validate().expect("valid");
    }

    #[test]
    fn empty_file_is_default_config() {
        let config = BitstampConfig::from_yaml("").expect("parse");
        assert_eq!(config.client_config().timeout, Duration::from_secs(30));
    }

    #[test]
    fn example_config_parses() {
        let content = include_str!("../examples/bitstamp.yaml");
        let config = BitstampConfig::from_yaml(content).expect("parse");
        config.validate().expect("valid");
        assert_eq!(config.credentials.client_id.as_deref(), Some("123456"));
    }

    #[test]
    fn rejects_bad_urls_and_timeouts() {
        let mut config = BitstampConfig::default();
        config.ws.url = "https://ws.bitstamp.net/".to_string();
        assert!(config.validate().is_err());

        let mut config = BitstampConfig::default();
        config.rest.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = BitstampConfig::default();
        config.rest.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn credentials_fall_back_to_environment() {
        let mut config = BitstampConfig::default();
        config.credentials.api_key = Some("file-key".to_string());

        let env: HashMap<&str, &str> = HashMap::from([
            (CLIENT_ID_ENV, "42"),
            (API_KEY_ENV, "env-key"),
            (API_SECRET_ENV, "env-secret"),
        ]);
        let credentials = config
            .credentials_with(|name| env.get(name).map(|value| value.to_string()))
            .expect("credentials");
        assert_eq!(credentials.api_key(), "file-key");
        assert_eq!(credentials.client_id(), "42");
    }

    #[test]
    fn missing_credentials_are_reported() {
        let config = BitstampConfig::default();
        let err = config.credentials_with(|_| None).expect_err("should fail");
        assert!(err.to_string().contains("missing: client_id, api_key, api_secret"));
    }
}
