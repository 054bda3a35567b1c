//! Per-request authentication claim extraction.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::credentials::CredentialStore;
use crate::token::{Secret, Token};

/// Credentials carried in an HTTP Basic `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    /// Claimed username.
    pub username: String,
    /// Plaintext password presented by the client.
    pub password: String,
}

/// Outcome of classifying a single request.
///
/// A tagged variant rather than a nullable string, so the decision table in
/// [`crate::DecisionEngine`] is an exhaustive compile-time-checked match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationResult {
    /// The request carried a claim that verified; the caller is `username`.
    Authenticated {
        /// Verified identity.
        username: String,
    },
    /// No claim was present, or none verified.
    Unauthenticated,
}

/// Derives at most one authentication claim from a request.
///
/// Borrows the process-wide credential store and secret; holds no state of
/// its own, so one classifier per request is free.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    store: &'a CredentialStore,
    secret: &'a Secret,
}

impl<'a> Classifier<'a> {
    /// Build a classifier over the shared store and secret.
    #[must_use]
    pub const fn new(store: &'a CredentialStore, secret: &'a Secret) -> Self {
        Self { store, secret }
    }

    /// Classify one request from its Basic credentials (if any) and the
    /// values of all cookies bearing the configured session-cookie name, in
    /// the order the transport presented them.
    ///
    /// Basic credentials are tried first and short-circuit the cookie scan
    /// on success. Cookies are then scanned first-match-wins: a malformed or
    /// non-verifying cookie is skipped, not fatal, which tolerates duplicate
    /// cookies left behind by domain-scope changes over a token's lifetime.
    #[must_use]
    pub fn classify<'v>(
        &self,
        credentials: Option<&BasicCredentials>,
        session_cookies: impl IntoIterator<Item = &'v str>,
        now: DateTime<Utc>,
    ) -> ClassificationResult {
        if let Some(basic) = credentials {
            if self.store.verify_password(&basic.username, &basic.password) {
                debug!(username = %basic.username, "basic credentials verified");
                return ClassificationResult::Authenticated {
                    username: basic.username.clone(),
                };
            }
            debug!(username = %basic.username, "basic credentials rejected");
        }

        for (index, value) in session_cookies.into_iter().enumerate() {
            let token = match Token::parse(value) {
                Ok(token) => token,
                Err(err) => {
                    debug!(index, error = %err, "session cookie failed to parse");
                    continue;
                }
            };
            if token.verify(self.secret, now) {
                debug!(index, username = %token.username(), "session cookie verified");
                return ClassificationResult::Authenticated {
                    username: token.username().to_string(),
                };
            }
            debug!(index, "session cookie failed verification");
        }

        ClassificationResult::Unauthenticated
    }
}
