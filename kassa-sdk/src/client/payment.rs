//! Typed HTTP client for the payment gateway REST API.

use reqwest::Client;
use url::Url;

use super::ClientError;
use crate::config::GatewayConfig;
use crate::objects::payment::{
    CancelOutcome, CreatePaymentEnvelope, PaymentMethod, PaymentMethodList, PaymentRequest,
    PaymentResponse, PaymentStatusReport,
};
use crate::signature::API_KEY_HEADER;
use crate::validation::validate_payment_request;

/// Stateless client for the payment gateway.
///
/// Endpoints (relative to the configured base URL):
///
/// - `POST create`: create a payment from a signed envelope.
/// - `GET status/{payment_id}`: fetch the current status, no caching.
/// - `POST cancel/{payment_id}`: cancel a pending payment.
/// - `GET methods`: list the methods the gateway currently accepts.
///
/// Every request carries the API key in the `X-API-Key` header. None of the
/// calls retry; the one deliberate exception to error propagation is
/// [`payment_methods`](Self::payment_methods), which degrades to bank cards
/// when the listing cannot be fetched.
#[derive(Debug, Clone)]
pub struct PaymentClient {
    http: Client,
    base_url: Url,
    api_key: String,
    secret: Vec<u8>,
}

impl PaymentClient {
    /// Create a new `PaymentClient`.
    ///
    /// * `base_url` - root of the payment API. A missing trailing slash is
    ///   added so endpoint paths join underneath it.
    /// * `api_key` - value for the `X-API-Key` header.
    /// * `secret` - shared HMAC secret for the creation metadata signature.
    pub fn new(mut base_url: Url, api_key: impl Into<String>, secret: impl Into<Vec<u8>>) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            http: Client::new(),
            base_url,
            api_key: api_key.into(),
            secret: secret.into(),
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            config.api_key.clone(),
            config.secret_bytes().to_owned(),
        )
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `POST create`: validate, sign, and submit a payment request.
    ///
    /// Validation failures are returned synchronously as
    /// [`ClientError::Validation`] without touching the network. Transport
    /// failures and non-2xx statuses are returned as-is; the call is never
    /// retried.
    pub async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentResponse, ClientError> {
        let report = validate_payment_request(request);
        if !report.is_valid() {
            return Err(ClientError::Validation(report.errors));
        }

        let envelope = CreatePaymentEnvelope::signed(request.clone(), &self.secret)?;
        let url = self.base_url.join("create")?;

        let resp = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&envelope)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `GET status/{payment_id}`: single status fetch, no caching.
    pub async fn payment_status(
        &self,
        payment_id: &str,
    ) -> Result<PaymentStatusReport, ClientError> {
        let url = self.base_url.join(&format!("status/{payment_id}"))?;

        let resp = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `POST cancel/{payment_id}`: cancel a pending payment.
    pub async fn cancel_payment(&self, payment_id: &str) -> Result<CancelOutcome, ClientError> {
        let url = self.base_url.join(&format!("cancel/{payment_id}"))?;

        let resp = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `GET methods`: list the payment methods the gateway accepts.
    ///
    /// Degrades gracefully: any failure falls back to bank cards so the
    /// checkout stays usable while the listing endpoint is down.
    pub async fn payment_methods(&self) -> Vec<PaymentMethod> {
        match self.fetch_payment_methods().await {
            Ok(methods) if !methods.is_empty() => methods,
            Ok(_) => vec![PaymentMethod::Card],
            Err(e) => {
                tracing::warn!(error = %e, "payment method listing failed, falling back to card");
                vec![PaymentMethod::Card]
            }
        }
    }

    async fn fetch_payment_methods(&self) -> Result<Vec<PaymentMethod>, ClientError> {
        let url = self.base_url.join("methods")?;

        let resp = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let list: PaymentMethodList = parse_response(resp).await?;
        Ok(list.methods)
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_a_trailing_slash() {
        let client = PaymentClient::new(
            Url::parse("https://shop.example.com/api/payments").unwrap(),
            "key",
            b"secret".to_vec(),
        );
        let url = client.base_url.join("status/pay_1").unwrap();
        assert_eq!(
            url.as_str(),
            "https://shop.example.com/api/payments/status/pay_1"
        );
    }

    #[test]
    fn existing_trailing_slash_is_kept() {
        let client = PaymentClient::new(
            Url::parse("https://shop.example.com/api/payments/").unwrap(),
            "key",
            b"secret".to_vec(),
        );
        let url = client.base_url.join("create").unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/api/payments/create");
    }
}
