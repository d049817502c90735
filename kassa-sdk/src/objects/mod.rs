//! Wire types exchanged with the payment gateway and the webhook receiver.

pub mod cart;
pub mod payment;
pub mod webhook;
