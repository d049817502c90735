//! Payment request and response types for the gateway REST API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cart::CartItem;
use crate::signature;

/// Payment methods offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Bank card, redirect-based confirmation.
    Card,
    /// QR code shown to the customer.
    Qr,
    /// Fast-payment-system transfer.
    Sbp,
}

impl PaymentMethod {
    /// Whether the method settles asynchronously and the customer confirms
    /// out-of-band (QR scan, SBP transfer).
    pub fn requires_confirmation(self) -> bool {
        matches!(self, PaymentMethod::Qr | PaymentMethod::Sbp)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Card => write!(f, "card"),
            PaymentMethod::Qr => write!(f, "qr"),
            PaymentMethod::Sbp => write!(f, "sbp"),
        }
    }
}

/// Settlement currency. The storefront only sells in rubles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "RUB")]
    Rub,
}

/// Customer contact details collected at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Request payload for creating a payment.
///
/// Must pass [`crate::validation::validate_payment_request`] before it is
/// sent anywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub items: Vec<CartItem>,
    pub total_amount: Decimal,
    #[serde(default)]
    pub currency: Currency,
    pub customer: CustomerInfo,
    pub payment_method: PaymentMethod,
    /// Where the gateway sends the customer back after confirmation.
    pub return_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

/// Metadata attached to every creation call: a source tag, the signing
/// timestamp, a client-generated request id, and an HMAC signature over the
/// request body so the gateway can attribute the call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetadata {
    pub source: String,
    pub timestamp: i64,
    pub request_id: Uuid,
    pub signature: String,
}

/// A [`PaymentRequest`] wrapped with its [`RequestMetadata`], as posted to
/// the creation endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentEnvelope {
    #[serde(flatten)]
    pub request: PaymentRequest,
    pub metadata: RequestMetadata,
}

impl CreatePaymentEnvelope {
    /// Wrap `request` with freshly signed metadata.
    pub fn signed(request: PaymentRequest, key: &[u8]) -> Result<Self, serde_json::Error> {
        let timestamp = time::OffsetDateTime::now_utc().unix_timestamp();
        let json = serde_json::to_string(&request)?;
        let metadata = RequestMetadata {
            source: "web".to_string(),
            timestamp,
            request_id: Uuid::new_v4(),
            signature: signature::sign(&json, timestamp, key),
        };
        Ok(Self { request, metadata })
    }
}

/// Response returned by the creation endpoint.
///
/// Immutable once received; a new payment attempt produces a new response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub success: bool,
    pub payment_id: String,
    /// Redirect URL for card payments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    /// QR-code image reference for qr/sbp payments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Lifecycle states reported by the status endpoint.
///
/// `pending`/`processing` may still move; the other three are terminal and
/// final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    Pending,
    Processing,
    Succeeded,
    Failed,
    Cancelled,
}

impl PaymentState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, PaymentState::Pending | PaymentState::Processing)
    }
}

impl std::fmt::Display for PaymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentState::Pending => write!(f, "pending"),
            PaymentState::Processing => write!(f, "processing"),
            PaymentState::Succeeded => write!(f, "succeeded"),
            PaymentState::Failed => write!(f, "failed"),
            PaymentState::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Response returned by the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusReport {
    pub payment_id: String,
    pub status: PaymentState,
    pub amount: Decimal,
    pub currency: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: time::OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response returned by the cancellation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response returned by the method-listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodList {
    pub methods: Vec<PaymentMethod>,
}
