//! StatusPoller processor.
//!
//! The StatusPoller drives the repeating status check for a payment that
//! awaits asynchronous confirmation:
//! - fetches the payment status every [`POLL_INTERVAL`]
//! - emits `CheckoutEvent::StatusChanged` whenever the observed status
//!   differs from the previous one
//! - emits `CheckoutEvent::Completed` exactly once, on the first terminal
//!   status or when [`CONFIRMATION_TIMEOUT`] elapses (timeout counts as a
//!   failed outcome)
//! - stops immediately on the shutdown signal without emitting anything,
//!   so a discarded payment never causes another network call

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use kassa_sdk::objects::payment::PaymentState;

use crate::events::{CheckoutEvent, CheckoutEventSender};
use crate::gateway::PaymentGateway;

/// Interval between status checks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// How long a payment may stay unconfirmed before it is treated as failed.
pub const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(600);

/// StatusPoller handles polling a single payment to its outcome.
pub struct StatusPoller<G> {
    gateway: Arc<G>,
    payment_id: String,
    event_tx: CheckoutEventSender,
    shutdown_rx: watch::Receiver<bool>,
    poll_interval: Duration,
    confirmation_timeout: Duration,
}

impl<G: PaymentGateway> StatusPoller<G> {
    /// Create a new StatusPoller with the default timing.
    ///
    /// # Arguments
    ///
    /// * `gateway` - Gateway to fetch statuses from
    /// * `payment_id` - The payment to poll
    /// * `event_tx` - Sender for checkout events
    /// * `shutdown_rx` - Receiver for the shutdown signal
    pub fn new(
        gateway: Arc<G>,
        payment_id: impl Into<String>,
        event_tx: CheckoutEventSender,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            gateway,
            payment_id: payment_id.into(),
            event_tx,
            shutdown_rx,
            poll_interval: POLL_INTERVAL,
            confirmation_timeout: CONFIRMATION_TIMEOUT,
        }
    }

    /// Override the poll interval and confirmation timeout.
    pub fn with_timing(mut self, poll_interval: Duration, confirmation_timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.confirmation_timeout = confirmation_timeout;
        self
    }

    /// Run the StatusPoller until a terminal status, timeout, or shutdown.
    pub async fn run(mut self) {
        info!(payment_id = %self.payment_id, "StatusPoller started");

        let deadline = Instant::now() + self.confirmation_timeout;
        let mut ticker = time::interval(self.poll_interval);
        // Delay keeps checks strictly sequential even when a fetch takes
        // longer than the interval: the next tick fires a full interval
        // after the late one, never concurrently with an in-flight fetch.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; the first real check
        // happens one interval after start.
        ticker.tick().await;

        let mut last_status: Option<PaymentState> = None;

        loop {
            tokio::select! {
                biased;

                // Check for shutdown
                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!(payment_id = %self.payment_id, "StatusPoller received shutdown signal");
                        break;
                    }
                }

                // Confirmation window elapsed without a terminal status
                _ = time::sleep_until(deadline) => {
                    warn!(
                        payment_id = %self.payment_id,
                        timeout_secs = self.confirmation_timeout.as_secs(),
                        "confirmation window elapsed, treating payment as failed"
                    );
                    self.emit(CheckoutEvent::Completed {
                        payment_id: self.payment_id.clone(),
                        success: false,
                    })
                    .await;
                    break;
                }

                // Next status check. The fetch is awaited to completion
                // inside this arm, so at most one request is in flight.
                _ = ticker.tick() => {
                    match self.gateway.payment_status(&self.payment_id).await {
                        Ok(report) => {
                            debug!(
                                payment_id = %self.payment_id,
                                status = %report.status,
                                "status check"
                            );

                            let terminal = report.status.is_terminal();
                            let success = report.status == PaymentState::Succeeded;
                            if last_status != Some(report.status) {
                                last_status = Some(report.status);
                                self.emit(CheckoutEvent::StatusChanged(report)).await;
                            }

                            if terminal {
                                self.emit(CheckoutEvent::Completed {
                                    payment_id: self.payment_id.clone(),
                                    success,
                                })
                                .await;
                                break;
                            }
                        }
                        Err(e) => {
                            // Transient transport failures do not end the
                            // run; the confirmation timeout bounds it.
                            warn!(
                                payment_id = %self.payment_id,
                                error = %e,
                                "status check failed, retrying on next tick"
                            );
                        }
                    }
                }
            }
        }

        info!(payment_id = %self.payment_id, "StatusPoller stopped");
    }

    async fn emit(&self, event: CheckoutEvent) {
        if self.event_tx.send(event).await.is_err() {
            debug!(payment_id = %self.payment_id, "event channel closed, dropping event");
        }
    }
}
