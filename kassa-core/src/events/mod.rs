//! Events emitted while a payment awaits confirmation.

mod channels;
mod types;

pub use channels::{
    CheckoutEventReceiver, CheckoutEventSender, DEFAULT_CHANNEL_BUFFER, checkout_event_channel,
};
pub use types::CheckoutEvent;
