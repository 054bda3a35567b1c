//! Shared HTTP constants (header names, challenge values, route labels).

/// Login-intent signal set by the proxy: `true` asks for a token.
pub(crate) const HEADER_LOGIN: &str = "x-gatekey-login";
/// Upstream-supplied cookie `Domain` override.
pub(crate) const HEADER_DOMAIN: &str = "x-gatekey-domain";
/// Identity-forwarding header emitted on authenticated responses.
pub(crate) const HEADER_USERNAME: &str = "x-gatekey-username";
/// Authentication-outcome indicator (`succeeded` or `failed`).
pub(crate) const HEADER_AUTH_OUTCOME: &str = "x-gatekey-authentication";
/// Client address as reported by the proxy.
pub(crate) const HEADER_REAL_IP: &str = "x-real-ip";
pub(crate) const HEADER_FORWARDED_METHOD: &str = "x-forwarded-method";
pub(crate) const HEADER_FORWARDED_PROTO: &str = "x-forwarded-proto";
pub(crate) const HEADER_FORWARDED_HOST: &str = "x-forwarded-host";
pub(crate) const HEADER_FORWARDED_URI: &str = "x-forwarded-uri";

pub(crate) const OUTCOME_SUCCEEDED: &str = "succeeded";
pub(crate) const OUTCOME_FAILED: &str = "failed";

/// Always-advertised challenge naming the login-form scheme.
pub(crate) const CHALLENGE_LOGIN: &str = "Gatekey-Login";
/// Fallback challenge for non-interactive clients.
pub(crate) const CHALLENGE_BASIC: &str = "Basic realm=\"gatekey\"";

pub(crate) const ROUTE_FORWARD_AUTH: &str = "forward_auth";
pub(crate) const ROUTE_HEALTHZ: &str = "healthz";
pub(crate) const ROUTE_METRICS: &str = "metrics";
