//! TOML configuration for the checkout service.
//!
//! ```toml
//! [gateway]
//! base_url = "https://shop.example.com/api/payments/"
//! api_key = "pk_live_..."
//! secret = "sk_live_..."
//!
//! [webhook]
//! secret = "whsec_..."
//! replay_window_secs = 300
//!
//! [checkout]
//! poll_interval_secs = 2
//! confirmation_timeout_secs = 600
//! notify_url = "https://shop.example.com/api/send-order"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use kassa_sdk::config::{GatewayConfig, ProviderKind};

use crate::processors::{CONFIRMATION_TIMEOUT, POLL_INTERVAL};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Root of the configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    pub gateway: GatewaySection,
    pub webhook: WebhookSection,
    #[serde(default)]
    pub checkout: CheckoutSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySection {
    pub base_url: Url,
    pub api_key: String,
    pub secret: String,
    /// Optional provider preset, used for display and webhook routing.
    pub provider: Option<ProviderKind>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookSection {
    pub secret: String,
    #[serde(default = "default_replay_window")]
    pub replay_window_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSection {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_confirmation_timeout")]
    pub confirmation_timeout_secs: u64,
    pub notify_url: Option<Url>,
}

impl Default for CheckoutSection {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            confirmation_timeout_secs: default_confirmation_timeout(),
            notify_url: None,
        }
    }
}

fn default_replay_window() -> i64 {
    kassa_sdk::signature::REPLAY_WINDOW
}

fn default_poll_interval() -> u64 {
    POLL_INTERVAL.as_secs()
}

fn default_confirmation_timeout() -> u64 {
    CONFIRMATION_TIMEOUT.as_secs()
}

impl FileConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

impl GatewaySection {
    pub fn to_gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            secret: self.secret.clone(),
        }
    }
}

impl CheckoutSection {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }
}
