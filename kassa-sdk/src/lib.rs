//! Shared types and client plumbing for the storefront checkout.
//!
//! This crate carries everything both sides of the payment flow agree on:
//! the wire types exchanged with the payment gateway, pre-flight request
//! validation, the HMAC-SHA256 signature scheme used for request metadata
//! and webhook authentication, and (behind the `client` feature) the typed
//! HTTP client for the gateway REST API.

#![forbid(unsafe_code)]

#[cfg(feature = "client")]
pub mod client;
pub mod config;
pub mod objects;
pub mod signature;
pub mod validation;
