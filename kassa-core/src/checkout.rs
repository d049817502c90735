//! Checkout flow controller.
//!
//! `CheckoutController` owns the transient checkout state (current phase,
//! last gateway response, last observed status, last user-facing error)
//! and serializes all operations against the payment gateway. Nothing else
//! mutates that state: the poller reports through an event channel and the
//! controller folds events in itself.
//!
//! Phase transitions:
//!
//! ```text
//! Idle ──create──▶ Creating ──ok──▶ AwaitingConfirmation ──▶ Succeeded
//!                     │                      │                Failed
//!                     └──err──▶ Failed       ├───────────────▶ Cancelled
//!                                            └──600 s────────▶ TimedOut
//! ```
//!
//! A confirmation timeout is delivered through the same channel as a
//! declined payment (`Completed { success: false }`); only the phase keeps
//! the distinction.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use url::Url;

use kassa_sdk::client::ClientError;
use kassa_sdk::objects::payment::{
    PaymentMethod, PaymentRequest, PaymentResponse, PaymentState, PaymentStatusReport,
};

use crate::events::{CheckoutEvent, CheckoutEventReceiver, checkout_event_channel};
use crate::gateway::PaymentGateway;
use crate::processors::{CONFIRMATION_TIMEOUT, POLL_INTERVAL, StatusPoller};

/// Where the checkout currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckoutPhase {
    /// No payment yet.
    Idle,
    /// A creation call is in flight; further creations are rejected.
    Creating,
    /// A payment exists and its status is being polled.
    AwaitingConfirmation,
    Succeeded,
    Failed,
    Cancelled,
    /// The confirmation window elapsed without a terminal status.
    TimedOut,
}

impl CheckoutPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CheckoutPhase::Succeeded
                | CheckoutPhase::Failed
                | CheckoutPhase::Cancelled
                | CheckoutPhase::TimedOut
        )
    }
}

impl std::fmt::Display for CheckoutPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckoutPhase::Idle => write!(f, "idle"),
            CheckoutPhase::Creating => write!(f, "creating"),
            CheckoutPhase::AwaitingConfirmation => write!(f, "awaiting_confirmation"),
            CheckoutPhase::Succeeded => write!(f, "succeeded"),
            CheckoutPhase::Failed => write!(f, "failed"),
            CheckoutPhase::Cancelled => write!(f, "cancelled"),
            CheckoutPhase::TimedOut => write!(f, "timed_out"),
        }
    }
}

/// Errors surfaced to the checkout UI. All messages are human-readable.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// A payment is already being created or confirmed.
    #[error("a payment is already in progress")]
    Busy,

    /// The gateway rejected the creation (`success: false`).
    #[error("payment was not accepted: {0}")]
    Rejected(String),

    /// Validation or transport failure from the gateway client.
    #[error(transparent)]
    Gateway(#[from] ClientError),
}

/// Handle to a spawned [`StatusPoller`] task.
///
/// `stop` (or dropping the handle) cancels the repeating check and the
/// timeout timer, so no further status calls are made for a payment the
/// UI has discarded.
pub struct PollerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
        self.task.abort();
    }
}

/// Drives a payment from creation to its outcome.
pub struct CheckoutController<G> {
    gateway: Arc<G>,
    http: reqwest::Client,
    phase: CheckoutPhase,
    payment: Option<PaymentResponse>,
    status: Option<PaymentStatusReport>,
    last_error: Option<String>,
    poller: Option<PollerHandle>,
    event_rx: Option<CheckoutEventReceiver>,
    notify_url: Option<Url>,
    poll_interval: Duration,
    confirmation_timeout: Duration,
}

impl<G: PaymentGateway + 'static> CheckoutController<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            http: reqwest::Client::new(),
            phase: CheckoutPhase::Idle,
            payment: None,
            status: None,
            last_error: None,
            poller: None,
            event_rx: None,
            notify_url: None,
            poll_interval: POLL_INTERVAL,
            confirmation_timeout: CONFIRMATION_TIMEOUT,
        }
    }

    /// Send an order summary to this URL after each successful creation.
    pub fn with_notify_url(mut self, url: Url) -> Self {
        self.notify_url = Some(url);
        self
    }

    /// Override the poller timing.
    pub fn with_timing(mut self, poll_interval: Duration, confirmation_timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.confirmation_timeout = confirmation_timeout;
        self
    }

    pub fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    /// The creation response, if a payment is live. Immutable once stored;
    /// a new attempt replaces it wholesale.
    pub fn payment(&self) -> Option<&PaymentResponse> {
        self.payment.as_ref()
    }

    pub fn status(&self) -> Option<&PaymentStatusReport> {
        self.status.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Create a payment and start confirmation polling.
    ///
    /// At most one payment may be in progress per controller: a call while
    /// the previous creation is still in flight, or while a payment awaits
    /// confirmation, is rejected with [`CheckoutError::Busy`]. The busy
    /// phase is released on every exit path: a failed creation lands in
    /// `Failed` with no dangling payment id.
    pub async fn create_payment(
        &mut self,
        request: PaymentRequest,
    ) -> Result<PaymentResponse, CheckoutError> {
        if matches!(
            self.phase,
            CheckoutPhase::Creating | CheckoutPhase::AwaitingConfirmation
        ) {
            return Err(CheckoutError::Busy);
        }

        self.phase = CheckoutPhase::Creating;
        self.last_error = None;
        self.status = None;

        match self.gateway.create_payment(&request).await {
            Ok(response) if response.success => {
                info!(payment_id = %response.payment_id, "payment created");
                self.payment = Some(response.clone());
                self.send_order_notification(&request, &response).await;
                self.begin_confirmation(response.payment_id.clone());
                Ok(response)
            }
            Ok(response) => {
                let reason = response
                    .error
                    .unwrap_or_else(|| "payment was not accepted".to_string());
                self.fail(reason.clone());
                Err(CheckoutError::Rejected(reason))
            }
            Err(e) => {
                self.fail(e.to_string());
                Err(CheckoutError::Gateway(e))
            }
        }
    }

    /// Start polling `payment_id` for confirmation.
    ///
    /// Any previous poller is stopped first; its timers are cancelled
    /// before the new one starts.
    pub fn begin_confirmation(&mut self, payment_id: String) {
        self.stop_polling();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (event_tx, event_rx) = checkout_event_channel();

        let poller = StatusPoller::new(Arc::clone(&self.gateway), payment_id, event_tx, shutdown_rx)
            .with_timing(self.poll_interval, self.confirmation_timeout);
        let task = tokio::spawn(poller.run());

        self.poller = Some(PollerHandle { shutdown_tx, task });
        self.event_rx = Some(event_rx);
        self.phase = CheckoutPhase::AwaitingConfirmation;
    }

    /// Receive the next poller event and fold it into the controller state.
    ///
    /// Returns `None` once polling has ended and the channel is drained.
    pub async fn next_event(&mut self) -> Option<CheckoutEvent> {
        let rx = self.event_rx.as_mut()?;
        let event = rx.recv().await?;

        match &event {
            CheckoutEvent::StatusChanged(report) => {
                self.status = Some(report.clone());
            }
            CheckoutEvent::Completed { success, .. } => {
                self.phase = if *success {
                    CheckoutPhase::Succeeded
                } else {
                    // A failure outcome without a terminal status on record
                    // means the confirmation window ran out.
                    match self.status.as_ref().map(|s| s.status) {
                        Some(PaymentState::Failed) => CheckoutPhase::Failed,
                        Some(PaymentState::Cancelled) => CheckoutPhase::Cancelled,
                        _ => CheckoutPhase::TimedOut,
                    }
                };
                if !*success {
                    self.last_error = Some(match self.phase {
                        CheckoutPhase::Cancelled => "payment was cancelled".to_string(),
                        CheckoutPhase::TimedOut => "payment confirmation timed out".to_string(),
                        _ => "payment failed".to_string(),
                    });
                }
                self.stop_polling();
            }
        }

        Some(event)
    }

    /// Drive polling until the outcome arrives.
    ///
    /// Returns `(success, payment_id)`, or `None` if polling was stopped
    /// before an outcome arrived.
    pub async fn await_outcome(&mut self) -> Option<(bool, String)> {
        while let Some(event) = self.next_event().await {
            if let CheckoutEvent::Completed {
                payment_id,
                success,
            } = event
            {
                return Some((success, payment_id));
            }
        }
        None
    }

    /// One-shot status fetch outside the polling loop.
    pub async fn check_payment_status(
        &mut self,
        payment_id: &str,
    ) -> Result<PaymentStatusReport, CheckoutError> {
        match self.gateway.payment_status(payment_id).await {
            Ok(report) => {
                self.status = Some(report.clone());
                Ok(report)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(CheckoutError::Gateway(e))
            }
        }
    }

    /// Ask the gateway to cancel a payment. Returns whether the gateway
    /// accepted the cancellation; the final state still arrives through
    /// polling or webhook.
    pub async fn cancel_payment(&mut self, payment_id: &str) -> Result<bool, CheckoutError> {
        match self.gateway.cancel_payment(payment_id).await {
            Ok(outcome) => Ok(outcome.success),
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(CheckoutError::Gateway(e))
            }
        }
    }

    /// List available payment methods (degrades to card on failure).
    pub async fn payment_methods(&self) -> Vec<PaymentMethod> {
        self.gateway.payment_methods().await
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Discard the current payment and return to `Idle`.
    ///
    /// Stops any live poller so its interval and timeout timers are
    /// cancelled before the state is dropped.
    pub fn reset(&mut self) {
        self.stop_polling();
        self.event_rx = None;
        self.phase = CheckoutPhase::Idle;
        self.payment = None;
        self.status = None;
        self.last_error = None;
    }

    fn stop_polling(&mut self) {
        if let Some(handle) = self.poller.take() {
            handle.stop();
        }
    }

    fn fail(&mut self, reason: String) {
        self.phase = CheckoutPhase::Failed;
        self.payment = None;
        self.last_error = Some(reason);
    }

    /// Fire-and-forget order summary to the notification endpoint.
    /// A failure here never interrupts the payment flow.
    async fn send_order_notification(&self, request: &PaymentRequest, response: &PaymentResponse) {
        let Some(url) = &self.notify_url else {
            return;
        };

        let body = serde_json::json!({
            "customer_email": request.customer.email,
            "customer_phone": request.customer.phone,
            "customer_name": request.customer.name.clone().unwrap_or_default(),
            "order_amount": request.total_amount,
            "order_id": response.payment_id,
            "items": request.items,
            "payment_method": request.payment_method,
        });

        match self.http.post(url.clone()).json(&body).send().await {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => {
                warn!(status = %resp.status(), "order notification rejected");
            }
            Err(e) => {
                warn!(error = %e, "order notification failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use kassa_sdk::objects::cart::{CartItem, Product};
    use kassa_sdk::objects::payment::{CancelOutcome, Currency, CustomerInfo};
    use rust_decimal::Decimal;
    use std::sync::Mutex;

    fn request() -> PaymentRequest {
        PaymentRequest {
            items: vec![CartItem {
                product: Product {
                    id: 1,
                    name: "Smartphone".to_string(),
                    price: "19.990 ₽".to_string(),
                    image: "https://cdn.example.com/p1.jpg".to_string(),
                    specs: vec![],
                },
                quantity: 1,
            }],
            total_amount: Decimal::from(19_990),
            currency: Currency::Rub,
            customer: CustomerInfo {
                email: "ivan@example.com".to_string(),
                phone: "+79161234567".to_string(),
                name: None,
            },
            payment_method: PaymentMethod::Qr,
            return_url: "https://shop.example.com/result".to_string(),
            webhook_url: None,
        }
    }

    fn report(payment_id: &str, status: PaymentState) -> PaymentStatusReport {
        let now = time::OffsetDateTime::now_utc();
        PaymentStatusReport {
            payment_id: payment_id.to_string(),
            status,
            amount: Decimal::from(19_990),
            currency: "RUB".to_string(),
            created_at: now,
            updated_at: now,
            error: None,
        }
    }

    struct FakeGateway {
        create_result: Mutex<Option<Result<PaymentResponse, ClientError>>>,
        statuses: Mutex<Vec<PaymentState>>,
    }

    impl FakeGateway {
        fn accepting(payment_id: &str, statuses: Vec<PaymentState>) -> Self {
            Self {
                create_result: Mutex::new(Some(Ok(PaymentResponse {
                    success: true,
                    payment_id: payment_id.to_string(),
                    payment_url: None,
                    qr_code: Some("data:image/png;base64,AAAA".to_string()),
                    error: None,
                    message: None,
                }))),
                statuses: Mutex::new(statuses),
            }
        }

        fn rejecting(reason: &str) -> Self {
            Self {
                create_result: Mutex::new(Some(Ok(PaymentResponse {
                    success: false,
                    payment_id: String::new(),
                    payment_url: None,
                    qr_code: None,
                    error: Some(reason.to_string()),
                    message: None,
                }))),
                statuses: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl PaymentGateway for FakeGateway {
        async fn create_payment(
            &self,
            _request: &PaymentRequest,
        ) -> Result<PaymentResponse, ClientError> {
            self.create_result
                .lock()
                .unwrap()
                .take()
                .expect("create_payment called more than once")
        }

        async fn payment_status(
            &self,
            payment_id: &str,
        ) -> Result<PaymentStatusReport, ClientError> {
            let mut statuses = self.statuses.lock().unwrap();
            let status = if statuses.len() > 1 {
                statuses.remove(0)
            } else {
                *statuses.first().unwrap_or(&PaymentState::Pending)
            };
            Ok(report(payment_id, status))
        }

        async fn cancel_payment(&self, _payment_id: &str) -> Result<CancelOutcome, ClientError> {
            Ok(CancelOutcome {
                success: true,
                message: None,
            })
        }

        async fn payment_methods(&self) -> Vec<PaymentMethod> {
            vec![PaymentMethod::Card, PaymentMethod::Qr]
        }
    }

    #[tokio::test(start_paused = true)]
    async fn full_flow_reaches_succeeded() {
        let gateway = Arc::new(FakeGateway::accepting(
            "pay_1",
            vec![
                PaymentState::Pending,
                PaymentState::Pending,
                PaymentState::Succeeded,
            ],
        ));
        let mut controller = CheckoutController::new(gateway);

        let response = controller.create_payment(request()).await.unwrap();
        assert_eq!(response.payment_id, "pay_1");
        assert_eq!(controller.phase(), CheckoutPhase::AwaitingConfirmation);

        let outcome = controller.await_outcome().await;
        assert_eq!(outcome, Some((true, "pay_1".to_string())));
        assert_eq!(controller.phase(), CheckoutPhase::Succeeded);
    }

    #[tokio::test(start_paused = true)]
    async fn second_creation_is_rejected_while_awaiting_confirmation() {
        let gateway = Arc::new(FakeGateway::accepting("pay_1", vec![PaymentState::Pending]));
        let mut controller = CheckoutController::new(gateway);

        controller.create_payment(request()).await.unwrap();
        assert_eq!(controller.phase(), CheckoutPhase::AwaitingConfirmation);

        let second = controller.create_payment(request()).await;
        assert!(matches!(second, Err(CheckoutError::Busy)));
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_creation_leaves_no_dangling_payment() {
        let gateway = Arc::new(FakeGateway::rejecting("insufficient funds"));
        let mut controller = CheckoutController::new(gateway);

        let result = controller.create_payment(request()).await;
        assert!(matches!(result, Err(CheckoutError::Rejected(_))));
        assert_eq!(controller.phase(), CheckoutPhase::Failed);
        assert!(controller.payment().is_none());
        assert_eq!(controller.last_error(), Some("insufficient funds"));

        // The failed attempt released the busy phase: a retry is allowed.
        let gateway = Arc::new(FakeGateway::accepting(
            "pay_2",
            vec![PaymentState::Succeeded],
        ));
        let mut controller = CheckoutController::new(gateway);
        assert!(controller.create_payment(request()).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_status_is_distinguished_from_timeout() {
        let gateway = Arc::new(FakeGateway::accepting(
            "pay_1",
            vec![PaymentState::Pending, PaymentState::Cancelled],
        ));
        let mut controller = CheckoutController::new(gateway);

        controller.create_payment(request()).await.unwrap();
        let outcome = controller.await_outcome().await;
        assert_eq!(outcome, Some((false, "pay_1".to_string())));
        assert_eq!(controller.phase(), CheckoutPhase::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_classified_as_timed_out() {
        let gateway = Arc::new(FakeGateway::accepting("pay_1", vec![PaymentState::Pending]));
        let mut controller = CheckoutController::new(gateway)
            .with_timing(Duration::from_secs(2), Duration::from_secs(10));

        controller.create_payment(request()).await.unwrap();
        let outcome = controller.await_outcome().await;
        assert_eq!(outcome, Some((false, "pay_1".to_string())));
        assert_eq!(controller.phase(), CheckoutPhase::TimedOut);
        assert_eq!(
            controller.last_error(),
            Some("payment confirmation timed out")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reset_returns_to_idle_and_stops_polling() {
        let gateway = Arc::new(FakeGateway::accepting("pay_1", vec![PaymentState::Pending]));
        let mut controller = CheckoutController::new(gateway);

        controller.create_payment(request()).await.unwrap();
        controller.reset();

        assert_eq!(controller.phase(), CheckoutPhase::Idle);
        assert!(controller.payment().is_none());
        assert!(controller.status().is_none());
        assert!(controller.last_error().is_none());
        assert!(controller.next_event().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn validation_failure_reaches_the_caller_as_gateway_error() {
        let gateway = Arc::new(FakeGateway {
            create_result: Mutex::new(Some(Err(ClientError::Validation(vec![
                "invalid email address".to_string(),
            ])))),
            statuses: Mutex::new(vec![]),
        });
        let mut controller = CheckoutController::new(gateway);

        let result = controller.create_payment(request()).await;
        assert!(matches!(
            result,
            Err(CheckoutError::Gateway(ClientError::Validation(_)))
        ));
        assert_eq!(controller.phase(), CheckoutPhase::Failed);
        assert!(
            controller
                .last_error()
                .is_some_and(|e| e.contains("email"))
        );
    }
}
