//! HTTP client for the payment gateway API.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the shared types do not pull in `reqwest`.

mod payment;
mod webhook;

pub use payment::PaymentClient;
pub use webhook::verify_webhook;

use reqwest::StatusCode;

/// Errors produced by the gateway HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request failed pre-flight validation; nothing was sent.
    #[error("invalid payment request: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway returned a non-2xx status code.
    #[error("api error: status {status}, body: {body}")]
    Api { status: StatusCode, body: String },

    /// Request or response body could not be (de)serialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}
