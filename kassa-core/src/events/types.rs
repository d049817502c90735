//! Event type definitions for the checkout flow.

use kassa_sdk::objects::payment::PaymentStatusReport;

/// Events emitted by the status poller.
///
/// Events are ephemeral: they describe what the poller observed, and the
/// controller folds them into its own state.
#[derive(Debug, Clone)]
pub enum CheckoutEvent {
    /// The observed status differs from the previous check; carries the
    /// full report, terminal or not.
    StatusChanged(PaymentStatusReport),
    /// The payment reached an outcome. Emitted exactly once per poller run:
    /// `success` is true only for a `succeeded` status; failures,
    /// cancellations, and confirmation timeouts all arrive as `false`.
    Completed { payment_id: String, success: bool },
}
