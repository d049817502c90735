//! HMAC-SHA256 signatures for gateway metadata and webhook payloads.
//!
//! The wire format is a lowercase hex digest of
//! `HMAC-SHA256("{timestamp}{payload}", secret)` carried next to the unix
//! timestamp it was computed with:
//!
//! ```text
//! X-Payment-Signature: 3f5a9c…
//! X-Payment-Timestamp: 1735689600
//! ```
//!
//! Verification goes through [`ring::hmac::verify`], which recomputes the
//! tag and compares in constant time, so the comparison never leaks how
//! many leading bytes of a forged signature were correct. Signatures older
//! (or further in the future) than [`REPLAY_WINDOW`] seconds are rejected
//! regardless of whether the HMAC matches.

/// Header name for the hex-encoded HMAC signature.
pub const SIGNATURE_HEADER: &str = "X-Payment-Signature";

/// Header name for the unix timestamp the signature was computed with.
pub const TIMESTAMP_HEADER: &str = "X-Payment-Timestamp";

/// Header name for the gateway API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Maximum allowed distance between a signature timestamp and the current
/// clock, in seconds.
pub const REPLAY_WINDOW: i64 = 5 * 60;

/// Errors produced by signature operations.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("invalid hex encoding")]
    InvalidHex,
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid signature")]
    SignatureMismatch,
    #[error("timestamp outside replay window")]
    Expired,
}

impl From<ring::error::Unspecified> for SignatureError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

/// Sign a payload: hex digest of `HMAC-SHA256("{timestamp}{payload}", key)`.
pub fn sign(payload: &str, timestamp: i64, key: &[u8]) -> String {
    let data = format!("{timestamp}{payload}");
    let tag = ring::hmac::sign(
        &ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key),
        data.as_bytes(),
    );
    hex::encode(tag.as_ref())
}

/// Verify a hex-encoded signature against `"{timestamp}{payload}"`.
///
/// The comparison is constant-time. This does **not** check timestamp
/// freshness; call [`check_replay_window`] for that.
pub fn verify(
    payload: &str,
    timestamp: i64,
    signature_hex: &str,
    key: &[u8],
) -> Result<(), SignatureError> {
    let supplied = hex::decode(signature_hex).map_err(|_| SignatureError::InvalidHex)?;
    let data = format!("{timestamp}{payload}");
    ring::hmac::verify(
        &ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key),
        data.as_bytes(),
        &supplied,
    )?;
    Ok(())
}

/// Check that a signature timestamp is within [`REPLAY_WINDOW`] of now.
///
/// Future timestamps beyond the window are rejected too, so a skewed or
/// captured-and-replayed notification fails either way.
pub fn check_replay_window(timestamp: i64) -> Result<(), SignatureError> {
    check_replay_window_with(timestamp, REPLAY_WINDOW)
}

/// [`check_replay_window`] with an explicit window, for deployments that
/// configure their own tolerance.
pub fn check_replay_window_with(timestamp: i64, window: i64) -> Result<(), SignatureError> {
    let now = time::OffsetDateTime::now_utc().unix_timestamp();
    if (now - timestamp).abs() > window {
        return Err(SignatureError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"webhook-shared-secret";

    #[test]
    fn sign_then_verify_roundtrip() {
        let body = r#"{"paymentId":"pay_1","status":"succeeded"}"#;
        let ts = time::OffsetDateTime::now_utc().unix_timestamp();
        let sig = sign(body, ts, KEY);
        assert!(verify(body, ts, &sig, KEY).is_ok());
    }

    #[test]
    fn tampered_body_is_rejected() {
        let ts = time::OffsetDateTime::now_utc().unix_timestamp();
        let sig = sign("original", ts, KEY);
        assert!(matches!(
            verify("tampered", ts, &sig, KEY),
            Err(SignatureError::SignatureMismatch)
        ));
    }

    #[test]
    fn wrong_key_is_rejected() {
        let ts = time::OffsetDateTime::now_utc().unix_timestamp();
        let sig = sign("body", ts, KEY);
        assert!(verify("body", ts, &sig, b"other-secret").is_err());
    }

    #[test]
    fn shifted_timestamp_invalidates_signature() {
        let ts = time::OffsetDateTime::now_utc().unix_timestamp();
        let sig = sign("body", ts, KEY);
        assert!(verify("body", ts + 1, &sig, KEY).is_err());
    }

    #[test]
    fn non_hex_signature_is_rejected() {
        assert!(matches!(
            verify("body", 0, "not hex!", KEY),
            Err(SignatureError::InvalidHex)
        ));
    }

    #[test]
    fn stale_timestamp_is_outside_replay_window() {
        let stale = time::OffsetDateTime::now_utc().unix_timestamp() - 400;
        assert!(matches!(
            check_replay_window(stale),
            Err(SignatureError::Expired)
        ));
    }

    #[test]
    fn future_timestamp_is_outside_replay_window() {
        let future = time::OffsetDateTime::now_utc().unix_timestamp() + 400;
        assert!(check_replay_window(future).is_err());
    }

    #[test]
    fn fresh_timestamp_passes_replay_window() {
        let now = time::OffsetDateTime::now_utc().unix_timestamp();
        assert!(check_replay_window(now - 10).is_ok());
    }
}
