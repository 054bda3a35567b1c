//! Forward-auth decision engine.
//!
//! # Design
//! - One request in, one [`Decision`] out; no cross-request state. The only
//!   shared resources (secret, credential store) are injected once at
//!   construction and never mutated.
//! - Successful logins answer with a reserved non-2xx status instead of 200:
//!   a forward-auth proxy forwards 2xx responses to the origin and returns
//!   everything else verbatim to the browser, so only a non-2xx response
//!   actually delivers the `Set-Cookie` header to the client.
//! - Every denial looks the same: unknown user, wrong password, forged
//!   token and expired token collapse into one 401 with the login page.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::classify::{BasicCredentials, ClassificationResult, Classifier};
use crate::credentials::CredentialStore;
use crate::token::{Secret, Token};

/// Default reserved status for "credentials accepted, token delivered".
///
/// Any non-2xx, non-3xx code that proxies pass through unmodified works;
/// the exact value is configuration, not semantics.
pub const DEFAULT_LOGIN_STATUS: u16 = 418;

/// Default name of the session cookie.
pub const DEFAULT_COOKIE_NAME: &str = "gatekey-token";

/// Tunable parameters for the decision engine.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Name of the session cookie to issue and accept.
    pub cookie_name: String,
    /// How long an issued token stays valid.
    pub lifespan: std::time::Duration,
    /// Status code for the "token delivered" response.
    pub login_status: u16,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            lifespan: std::time::Duration::from_secs(60 * 60 * 24 * 100),
            login_status: DEFAULT_LOGIN_STATUS,
        }
    }
}

/// Per-request input to the decision engine, already lifted out of the
/// transport by the HTTP layer.
#[derive(Debug, Clone, Default)]
pub struct AuthRequest {
    /// Basic credentials from the `Authorization` header, if present.
    pub credentials: Option<BasicCredentials>,
    /// Values of all cookies bearing the session-cookie name, in transport
    /// order. A request may legitimately carry more than one.
    pub session_cookies: Vec<String>,
    /// Login-intent signal: `true` asks for a token to be issued,
    /// `false` is a transparent proxy check.
    pub login: bool,
    /// Upstream-supplied `Domain` attribute for the issued cookie, consumed
    /// verbatim; `None` scopes the cookie to the requesting host.
    pub cookie_domain: Option<String>,
    /// Whether the client is a browser (derived from `Accept`); decides
    /// whether HTTP Basic is advertised as a fallback challenge.
    pub wants_html: bool,
}

/// Who, if anyone, the request was resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The caller authenticated as `username`.
    Granted {
        /// Resolved identity, for the identity-forwarding header.
        username: String,
    },
    /// The caller could not be authenticated.
    Denied,
}

/// The engine's verdict for one request, ready to be rendered as an HTTP
/// response by the transport layer.
#[derive(Debug, Clone)]
pub struct Decision {
    /// Authentication outcome, driving the outcome and identity headers.
    pub outcome: AuthOutcome,
    /// HTTP status to answer with.
    pub status: u16,
    /// Fully formed `Set-Cookie` header value, present only on successful
    /// login requests.
    pub set_cookie: Option<String>,
    /// Whether to additionally advertise `Basic` in `WWW-Authenticate` so
    /// non-interactive clients can authenticate without the HTML form.
    pub advertise_basic: bool,
    /// Whether the response body is the login page; `false` means no body.
    pub include_login_page: bool,
}

/// Stateless forward-authentication decision engine.
///
/// Owns the immutable process-wide configuration (secret, credential store,
/// cookie parameters) and decides one request at a time. Cheap to share
/// behind an `Arc`; requests never contend on it.
#[derive(Debug)]
pub struct DecisionEngine {
    secret: Secret,
    store: CredentialStore,
    cookie_name: String,
    lifespan: Duration,
    login_status: u16,
}

impl DecisionEngine {
    /// Build an engine over the loaded secret and credential store.
    #[must_use]
    pub fn new(secret: Secret, store: CredentialStore, options: EngineOptions) -> Self {
        let lifespan = Duration::seconds(
            i64::try_from(options.lifespan.as_secs()).unwrap_or(i64::MAX),
        );
        Self {
            secret,
            store,
            cookie_name: options.cookie_name,
            lifespan,
            login_status: options.login_status,
        }
    }

    /// Decide one request at time `now`.
    #[must_use]
    pub fn decide(&self, request: &AuthRequest, now: DateTime<Utc>) -> Decision {
        let classification = Classifier::new(&self.store, &self.secret).classify(
            request.credentials.as_ref(),
            request.session_cookies.iter().map(String::as_str),
            now,
        );

        match (classification, request.login) {
            (ClassificationResult::Unauthenticated, login) => Decision {
                outcome: AuthOutcome::Denied,
                status: 401,
                set_cookie: None,
                advertise_basic: !login && !request.wants_html,
                include_login_page: true,
            },
            (ClassificationResult::Authenticated { username }, false) => Decision {
                outcome: AuthOutcome::Granted { username },
                status: 200,
                set_cookie: None,
                advertise_basic: false,
                include_login_page: false,
            },
            (ClassificationResult::Authenticated { username }, true) => {
                let token = Token::issue(&self.secret, &username, now + self.lifespan);
                debug!(username = %username, expires_at = %token.expires_at(), "issuing session token");
                let set_cookie =
                    self.build_set_cookie(&token, request.cookie_domain.as_deref(), now);
                Decision {
                    outcome: AuthOutcome::Granted { username },
                    status: self.login_status,
                    set_cookie: Some(set_cookie),
                    advertise_basic: false,
                    include_login_page: true,
                }
            }
        }
    }

    /// Name of the session cookie the engine issues and accepts.
    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Number of provisioned identities, for health reporting.
    #[must_use]
    pub fn credential_count(&self) -> usize {
        self.store.len()
    }

    fn build_set_cookie(&self, token: &Token, domain: Option<&str>, now: DateTime<Utc>) -> String {
        let max_age = token.remaining_lifetime(now).num_seconds();
        let mut cookie = format!(
            "{}={}; Path=/; Secure; HttpOnly; SameSite=Strict; Max-Age={}",
            self.cookie_name, token, max_age
        );
        if let Some(domain) = domain {
            cookie.push_str("; Domain=");
            cookie.push_str(domain);
        }
        cookie
    }
}
