//! Webhook payload types for payment state-change notifications.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Statuses delivered by webhook.
///
/// Only terminal statuses are notified. Anything the gateway adds later
/// deserializes to [`WebhookStatus::Unknown`] so it can be ignored instead
/// of failing the whole delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookStatus {
    Succeeded,
    Failed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for WebhookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebhookStatus::Succeeded => write!(f, "succeeded"),
            WebhookStatus::Failed => write!(f, "failed"),
            WebhookStatus::Cancelled => write!(f, "cancelled"),
            WebhookStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// A payment state-change notification as posted to the webhook endpoint.
///
/// Consumed once; this core never persists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub payment_id: String,
    pub status: WebhookStatus,
    pub amount: Decimal,
    pub currency: String,
    /// Free-form merchant metadata echoed back by the gateway
    /// (e.g. `{"orderId": "o1"}`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Unix timestamp of the state change.
    pub timestamp: i64,
}

impl WebhookPayload {
    /// The merchant order id from the metadata echo, if present.
    pub fn order_id(&self) -> Option<String> {
        self.metadata
            .as_ref()?
            .get("orderId")?
            .as_str()
            .map(str::to_owned)
    }
}
