//! Gateway configuration and payment-provider presets.

use serde::{Deserialize, Serialize};
use url::Url;

/// Connection settings for the payment gateway API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Root URL of the payment API, e.g. `https://shop.example.com/api/payments/`.
    pub base_url: Url,
    /// API key sent with every request.
    pub api_key: String,
    /// Shared secret for metadata and webhook signatures.
    pub secret: String,
}

impl GatewayConfig {
    /// Secret key bytes for HMAC signing.
    pub fn secret_bytes(&self) -> &[u8] {
        self.secret.as_bytes()
    }
}

/// Payment providers the storefront knows how to talk to.
///
/// Each preset carries the provider's public API root and the path the
/// backend mounts its webhook receiver on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Yookassa,
    Sberbank,
    Tinkoff,
    Cloudpayments,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Yookassa,
        ProviderKind::Sberbank,
        ProviderKind::Tinkoff,
        ProviderKind::Cloudpayments,
    ];

    pub fn api_url(self) -> &'static str {
        match self {
            ProviderKind::Yookassa => "https://api.yookassa.ru/v3",
            ProviderKind::Sberbank => "https://securepayments.sberbank.ru/payment/rest",
            ProviderKind::Tinkoff => "https://securepay.tinkoff.ru/v2",
            ProviderKind::Cloudpayments => "https://api.cloudpayments.ru",
        }
    }

    pub fn webhook_endpoint(self) -> &'static str {
        match self {
            ProviderKind::Yookassa => "/webhooks/yookassa",
            ProviderKind::Sberbank => "/webhooks/sberbank",
            ProviderKind::Tinkoff => "/webhooks/tinkoff",
            ProviderKind::Cloudpayments => "/webhooks/cloudpayments",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Yookassa => write!(f, "yookassa"),
            ProviderKind::Sberbank => write!(f, "sberbank"),
            ProviderKind::Tinkoff => write!(f, "tinkoff"),
            ProviderKind::Cloudpayments => write!(f, "cloudpayments"),
        }
    }
}
