//! Webhook intake for payment status notifications.
//!
//! Incoming notifications are authenticated before anything else looks at
//! them: the handler checks the HMAC signature and the timestamp freshness
//! first, and only then maps the payload onto an order-management action.
//! A payload that fails either check never reaches order management.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use kassa_sdk::signature::{self, SignatureError};
use kassa_sdk::objects::webhook::{WebhookPayload, WebhookStatus};

/// Final state an order is moved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderOutcome {
    Paid,
    Cancelled,
}

/// Order state change derived from a webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderUpdate {
    /// Merchant-side order id, if the provider echoed it back in metadata.
    pub order_id: Option<String>,
    pub payment_id: String,
    pub status: OrderOutcome,
    /// Confirmed amount. Present for paid orders only.
    pub amount: Option<rust_decimal::Decimal>,
}

/// Customer-facing failure notice derived from a webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureNotice {
    pub kind: String,
    pub payment_id: String,
    pub reason: String,
}

/// What the caller should do with a verified notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "snake_case")]
pub enum WebhookAction {
    UpdateOrder(OrderUpdate),
    SendNotification(FailureNotice),
    /// Status not recognized; acknowledged and dropped.
    Ignore,
}

/// Verifies and interprets payment notifications.
pub struct WebhookHandler {
    secret: Vec<u8>,
    replay_window: i64,
}

impl WebhookHandler {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            replay_window: signature::REPLAY_WINDOW,
        }
    }

    /// Override the accepted timestamp skew, in seconds.
    pub fn with_replay_window(mut self, seconds: i64) -> Self {
        self.replay_window = seconds;
        self
    }

    /// Check the signature and timestamp of a raw notification body.
    pub fn validate_signature(
        &self,
        body: &str,
        signature_hex: &str,
        timestamp: i64,
    ) -> Result<(), SignatureError> {
        signature::verify(body, timestamp, signature_hex, &self.secret)?;
        signature::check_replay_window_with(timestamp, self.replay_window)
    }

    /// Map a verified payload onto an order-management action.
    pub fn process(&self, payload: &WebhookPayload) -> WebhookAction {
        match payload.status {
            WebhookStatus::Succeeded => WebhookAction::UpdateOrder(OrderUpdate {
                order_id: payload.order_id(),
                payment_id: payload.payment_id.clone(),
                status: OrderOutcome::Paid,
                amount: Some(payload.amount),
            }),
            WebhookStatus::Failed => WebhookAction::SendNotification(FailureNotice {
                kind: "payment_failed".to_string(),
                payment_id: payload.payment_id.clone(),
                reason: "Payment processing failed".to_string(),
            }),
            WebhookStatus::Cancelled => WebhookAction::UpdateOrder(OrderUpdate {
                order_id: payload.order_id(),
                payment_id: payload.payment_id.clone(),
                status: OrderOutcome::Cancelled,
                amount: None,
            }),
            WebhookStatus::Unknown => {
                info!(payment_id = %payload.payment_id, "unrecognized webhook status, ignoring");
                WebhookAction::Ignore
            }
        }
    }

    /// Authenticate a raw notification and derive the action in one step.
    pub fn handle(
        &self,
        body: &str,
        signature_hex: &str,
        timestamp: i64,
    ) -> Result<WebhookAction, SignatureError> {
        if let Err(e) = self.validate_signature(body, signature_hex, timestamp) {
            warn!(error = %e, "webhook rejected");
            return Err(e);
        }
        let payload: WebhookPayload = serde_json::from_str(body)?;
        Ok(self.process(&payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kassa_sdk::signature::sign;
    use rust_decimal::Decimal;

    const SECRET: &[u8] = b"webhook-test-secret";

    fn payload_json(status: &str, metadata: Option<&str>) -> String {
        let metadata = metadata.unwrap_or("null");
        format!(
            r#"{{"paymentId":"pay_77","status":"{status}","amount":52970,"currency":"RUB","metadata":{metadata},"timestamp":1700000000}}"#
        )
    }

    fn handler() -> WebhookHandler {
        WebhookHandler::new(SECRET)
    }

    fn now() -> i64 {
        time::OffsetDateTime::now_utc().unix_timestamp()
    }

    #[test]
    fn succeeded_maps_to_paid_order_update() {
        let body = payload_json("succeeded", Some(r#"{"orderId":"order_42"}"#));
        let ts = now();
        let sig = sign(&body, ts, SECRET);

        let action = handler().handle(&body, &sig, ts).unwrap();
        assert_eq!(
            action,
            WebhookAction::UpdateOrder(OrderUpdate {
                order_id: Some("order_42".to_string()),
                payment_id: "pay_77".to_string(),
                status: OrderOutcome::Paid,
                amount: Some(Decimal::from(52_970)),
            })
        );
    }

    #[test]
    fn failed_maps_to_failure_notice() {
        let body = payload_json("failed", None);
        let ts = now();
        let sig = sign(&body, ts, SECRET);

        let action = handler().handle(&body, &sig, ts).unwrap();
        assert_eq!(
            action,
            WebhookAction::SendNotification(FailureNotice {
                kind: "payment_failed".to_string(),
                payment_id: "pay_77".to_string(),
                reason: "Payment processing failed".to_string(),
            })
        );
    }

    #[test]
    fn cancelled_maps_to_cancelled_order_without_amount() {
        let body = payload_json("cancelled", None);
        let ts = now();
        let sig = sign(&body, ts, SECRET);

        let action = handler().handle(&body, &sig, ts).unwrap();
        let WebhookAction::UpdateOrder(update) = action else {
            panic!("expected an order update");
        };
        assert_eq!(update.status, OrderOutcome::Cancelled);
        assert_eq!(update.amount, None);
    }

    #[test]
    fn unknown_status_is_ignored() {
        let body = payload_json("refund_pending", None);
        let ts = now();
        let sig = sign(&body, ts, SECRET);

        let action = handler().handle(&body, &sig, ts).unwrap();
        assert_eq!(action, WebhookAction::Ignore);
    }

    #[test]
    fn tampered_body_never_reaches_processing() {
        let body = payload_json("succeeded", None);
        let ts = now();
        let sig = sign(&body, ts, SECRET);

        let tampered = body.replace("52970", "1");
        let result = handler().handle(&tampered, &sig, ts);
        assert!(matches!(result, Err(SignatureError::SignatureMismatch)));
    }

    #[test]
    fn stale_timestamp_is_rejected_even_with_a_valid_signature() {
        let body = payload_json("succeeded", None);
        let ts = now() - 400;
        let sig = sign(&body, ts, SECRET);

        let result = handler().handle(&body, &sig, ts);
        assert!(matches!(result, Err(SignatureError::Expired)));
    }

    #[test]
    fn widened_replay_window_accepts_older_notifications() {
        let body = payload_json("succeeded", None);
        let ts = now() - 400;
        let sig = sign(&body, ts, SECRET);

        let action = handler()
            .with_replay_window(600)
            .handle(&body, &sig, ts)
            .unwrap();
        assert!(matches!(action, WebhookAction::UpdateOrder(_)));
    }

    #[test]
    fn action_serializes_with_tagged_shape() {
        let action = WebhookAction::SendNotification(FailureNotice {
            kind: "payment_failed".to_string(),
            payment_id: "pay_77".to_string(),
            reason: "Payment processing failed".to_string(),
        });
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["action"], "send_notification");
        assert_eq!(json["data"]["kind"], "payment_failed");
    }
}
