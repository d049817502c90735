//! Customer session context for checkout calls.
//!
//! The storefront attaches a session token to payment-related requests
//! when the customer is signed in. The context is deliberately small: a
//! token, when it was issued, and an optional expiry. Callers treat an
//! expired token the same as no token at all.

use time::{Duration, OffsetDateTime};

/// A bearer token with its validity window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub value: String,
    pub issued_at: OffsetDateTime,
    /// `None` means the token does not expire client-side.
    pub expires_at: Option<OffsetDateTime>,
}

impl SessionToken {
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => OffsetDateTime::now_utc() >= expires_at,
            None => false,
        }
    }
}

/// Holds the current customer session, if any.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    token: Option<SessionToken>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session with the given token and optional time-to-live.
    pub fn begin(&mut self, token: impl Into<String>, ttl: Option<Duration>) {
        let issued_at = OffsetDateTime::now_utc();
        self.token = Some(SessionToken {
            value: token.into(),
            issued_at,
            expires_at: ttl.map(|ttl| issued_at + ttl),
        });
    }

    /// The current token, or `None` when absent or expired.
    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref().filter(|t| !t.is_expired())
    }

    pub fn is_active(&self) -> bool {
        self.token().is_some()
    }

    pub fn clear(&mut self) {
        self.token = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_is_active() {
        let mut session = SessionContext::new();
        session.begin("tok_abc", Some(Duration::hours(1)));

        assert!(session.is_active());
        assert_eq!(session.token().map(|t| t.value.as_str()), Some("tok_abc"));
    }

    #[test]
    fn expired_token_reads_as_absent() {
        let mut session = SessionContext::new();
        session.begin("tok_old", Some(Duration::seconds(-1)));

        assert!(!session.is_active());
        assert!(session.token().is_none());
    }

    #[test]
    fn token_without_ttl_never_expires() {
        let mut session = SessionContext::new();
        session.begin("tok_forever", None);

        assert!(session.is_active());
    }

    #[test]
    fn clear_ends_the_session() {
        let mut session = SessionContext::new();
        session.begin("tok_abc", None);
        session.clear();

        assert!(!session.is_active());
    }
}
