//! Pre-flight validation of payment requests.
//!
//! Runs before any network call; a request that fails here is reported
//! synchronously and never retried.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

use crate::objects::payment::PaymentRequest;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles");
    /// Russian mobile numbers, matched after separators are stripped:
    /// optional +7/7/8 prefix, then ten digits starting with 4, 8 or 9.
    static ref PHONE_RE: Regex =
        Regex::new(r"^(\+7|7|8)?[489][0-9]{9}$").expect("phone pattern compiles");
}

/// Outcome of validating a [`PaymentRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate a payment request. Pure; collects every failure rather than
/// stopping at the first.
pub fn validate_payment_request(request: &PaymentRequest) -> ValidationReport {
    let mut errors = Vec::new();

    if request.items.is_empty() {
        errors.push("cart is empty".to_string());
    }

    if request.total_amount <= Decimal::ZERO {
        errors.push("payment amount must be positive".to_string());
    }

    if !is_valid_email(&request.customer.email) {
        errors.push("invalid email address".to_string());
    }

    if !is_valid_phone(&request.customer.phone) {
        errors.push("invalid phone number".to_string());
    }

    if request.return_url.trim().is_empty() {
        errors.push("return URL is missing".to_string());
    }

    ValidationReport { errors }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    let stripped: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    PHONE_RE.is_match(&stripped)
}
