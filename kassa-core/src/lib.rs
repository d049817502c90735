#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod checkout;
pub mod config;
pub mod events;
pub mod gateway;
pub mod processors;
pub mod session;
pub mod webhook;
