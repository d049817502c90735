//! Seam between the checkout flow and the payment gateway HTTP API.

use async_trait::async_trait;
use kassa_sdk::client::{ClientError, PaymentClient};
use kassa_sdk::objects::payment::{
    CancelOutcome, PaymentMethod, PaymentRequest, PaymentResponse, PaymentStatusReport,
};

/// The gateway operations the checkout flow depends on.
///
/// [`PaymentClient`] is the production implementation; tests substitute
/// scripted fakes so polling and state transitions can be driven without a
/// network.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentResponse, ClientError>;

    async fn payment_status(&self, payment_id: &str)
    -> Result<PaymentStatusReport, ClientError>;

    async fn cancel_payment(&self, payment_id: &str) -> Result<CancelOutcome, ClientError>;

    async fn payment_methods(&self) -> Vec<PaymentMethod>;
}

#[async_trait]
impl PaymentGateway for PaymentClient {
    async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentResponse, ClientError> {
        PaymentClient::create_payment(self, request).await
    }

    async fn payment_status(
        &self,
        payment_id: &str,
    ) -> Result<PaymentStatusReport, ClientError> {
        PaymentClient::payment_status(self, payment_id).await
    }

    async fn cancel_payment(&self, payment_id: &str) -> Result<CancelOutcome, ClientError> {
        PaymentClient::cancel_payment(self, payment_id).await
    }

    async fn payment_methods(&self) -> Vec<PaymentMethod> {
        PaymentClient::payment_methods(self).await
    }
}
