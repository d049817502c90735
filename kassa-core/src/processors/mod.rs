//! Background processors for the checkout flow.

mod status_poller;

pub use status_poller::{CONFIRMATION_TIMEOUT, POLL_INTERVAL, StatusPoller};
