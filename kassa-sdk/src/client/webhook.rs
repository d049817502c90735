//! Webhook verification helper.
//!
//! Convenience wrapper over the [`crate::signature`] primitives for
//! receivers of gateway webhooks: verify the HMAC (constant-time), check
//! the replay window, then deserialize the payload.

use serde::de::DeserializeOwned;

use crate::signature::{self, SignatureError};

/// Verify and deserialize an incoming webhook body.
///
/// * `body` - raw JSON request body string.
/// * `signature_hex` - value of the `X-Payment-Signature` header.
/// * `timestamp` - value of the `X-Payment-Timestamp` header.
/// * `secret` - the shared HMAC secret.
///
/// Returns the authenticated payload, typically a
/// [`crate::objects::webhook::WebhookPayload`].
pub fn verify_webhook<T: DeserializeOwned>(
    body: &str,
    signature_hex: &str,
    timestamp: i64,
    secret: &[u8],
) -> Result<T, SignatureError> {
    signature::verify(body, timestamp, signature_hex, secret)?;
    signature::check_replay_window(timestamp)?;
    Ok(serde_json::from_str(body)?)
}
