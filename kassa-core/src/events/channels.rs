//! Event channel factory and handles.

use super::types::CheckoutEvent;
use tokio::sync::mpsc;

/// Buffer size for checkout event channels.
///
/// A poller produces at most one event every poll interval, so a small
/// buffer keeps memory bounded without ever blocking the poller in
/// practice.
pub const DEFAULT_CHANNEL_BUFFER: usize = 64;

/// Sender handle for [`CheckoutEvent`]s.
pub type CheckoutEventSender = mpsc::Sender<CheckoutEvent>;
/// Receiver handle for [`CheckoutEvent`]s.
pub type CheckoutEventReceiver = mpsc::Receiver<CheckoutEvent>;

/// Create a new checkout event channel.
///
/// Each poller run gets its own channel; the controller holds the receiver.
pub fn checkout_event_channel() -> (CheckoutEventSender, CheckoutEventReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
