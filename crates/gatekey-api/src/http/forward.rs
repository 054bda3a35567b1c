//! The forward-auth catch-all handler.
//!
//! Every request the reverse proxy receives lands here (except the
//! diagnostics routes). The handler lifts the authentication claim out of
//! the transport, hands it to the decision engine and renders the verdict.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Request, StatusCode, header},
    response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::Utc;
use gatekey_core::{AuthOutcome, AuthRequest, BasicCredentials, Decision};
use tracing::{info, warn};

use crate::http::constants::{
    CHALLENGE_BASIC, CHALLENGE_LOGIN, HEADER_AUTH_OUTCOME, HEADER_DOMAIN,
    HEADER_FORWARDED_HOST, HEADER_FORWARDED_METHOD, HEADER_FORWARDED_PROTO, HEADER_FORWARDED_URI,
    HEADER_LOGIN, HEADER_REAL_IP, HEADER_USERNAME, OUTCOME_FAILED, OUTCOME_SUCCEEDED,
};
use crate::state::ApiState;

pub(crate) async fn forward_auth(
    State(state): State<Arc<ApiState>>,
    req: Request<Body>,
) -> Response {
    let headers = req.headers();
    let auth_request = AuthRequest {
        credentials: basic_credentials(headers),
        session_cookies: session_cookies(headers, state.engine.cookie_name()),
        login: header_str(headers, HEADER_LOGIN) == Some("true"),
        cookie_domain: header_str(headers, HEADER_DOMAIN)
            .filter(|value| !value.is_empty())
            .map(str::to_string),
        wants_html: headers
            .get(header::ACCEPT)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|accept| accept.contains("text/html")),
    };

    let decision = state.engine.decide(&auth_request, Utc::now());

    let succeeded = matches!(decision.outcome, AuthOutcome::Granted { .. });
    state.metrics.record_auth(succeeded);
    if decision.set_cookie.is_some() {
        state.metrics.inc_token_issued();
    }
    info!(
        client_ip = header_str(headers, HEADER_REAL_IP).unwrap_or("-"),
        method = header_str(headers, HEADER_FORWARDED_METHOD).unwrap_or("-"),
        proto = header_str(headers, HEADER_FORWARDED_PROTO).unwrap_or("-"),
        host = header_str(headers, HEADER_FORWARDED_HOST).unwrap_or("-"),
        uri = header_str(headers, HEADER_FORWARDED_URI).unwrap_or("-"),
        login = auth_request.login,
        status = decision.status,
        outcome = if succeeded { OUTCOME_SUCCEEDED } else { OUTCOME_FAILED },
        "forward auth decision"
    );

    render(&decision, &state.login_page)
}

/// Turn a [`Decision`] into the wire response.
fn render(decision: &Decision, login_page: &[u8]) -> Response {
    let status = StatusCode::from_u16(decision.status).unwrap_or(StatusCode::UNAUTHORIZED);
    let mut headers = HeaderMap::new();

    let outcome = if matches!(decision.outcome, AuthOutcome::Granted { .. }) {
        OUTCOME_SUCCEEDED
    } else {
        OUTCOME_FAILED
    };
    headers.insert(
        HeaderName::from_static(HEADER_AUTH_OUTCOME),
        HeaderValue::from_static(outcome),
    );

    if let AuthOutcome::Granted { username } = &decision.outcome {
        match HeaderValue::from_str(username) {
            Ok(value) => {
                headers.insert(HeaderName::from_static(HEADER_USERNAME), value);
            }
            Err(_) => warn!("username not representable as a header value"),
        }
    }

    if status != StatusCode::OK {
        headers.append(
            header::WWW_AUTHENTICATE,
            HeaderValue::from_static(CHALLENGE_LOGIN),
        );
        if decision.advertise_basic {
            headers.append(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(CHALLENGE_BASIC),
            );
        }
    }

    if let Some(cookie) = &decision.set_cookie {
        match HeaderValue::from_str(cookie) {
            Ok(value) => {
                headers.insert(header::SET_COOKIE, value);
            }
            Err(_) => warn!("set-cookie value not representable as a header value"),
        }
    }

    let body = if decision.include_login_page {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
        Body::from(login_page.to_vec())
    } else {
        Body::empty()
    };

    (status, headers, body).into_response()
}

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Decode HTTP Basic credentials from the `Authorization` header.
///
/// Anything that does not decode cleanly is treated as absent; the decision
/// engine then denies the request through the normal path.
fn basic_credentials(headers: &HeaderMap) -> Option<BasicCredentials> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value
        .strip_prefix("Basic ")
        .or_else(|| value.strip_prefix("basic "))?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (username, password) = text.split_once(':')?;
    Some(BasicCredentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// Collect the values of every cookie named `cookie_name`, preserving the
/// order the transport presented them in. A request may carry duplicates
/// (overlapping domain scopes); the classifier scans them first-match-wins.
fn session_cookies(headers: &HeaderMap, cookie_name: &str) -> Vec<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(name: header::HeaderName, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).expect("valid header"));
        headers
    }

    #[test]
    fn basic_credentials_decode() {
        let headers = headers_with(
            header::AUTHORIZATION,
            &format!("Basic {}", STANDARD.encode("alice:wonderland")),
        );
        let creds = basic_credentials(&headers).expect("must decode");
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "wonderland");
    }

    #[test]
    fn basic_credentials_keep_colons_in_password() {
        let headers = headers_with(
            header::AUTHORIZATION,
            &format!("Basic {}", STANDARD.encode("alice:a:b:c")),
        );
        let creds = basic_credentials(&headers).expect("must decode");
        assert_eq!(creds.password, "a:b:c");
    }

    #[test]
    fn non_basic_authorization_is_ignored() {
        let headers = headers_with(header::AUTHORIZATION, "Bearer sometoken");
        assert!(basic_credentials(&headers).is_none());
        let headers = headers_with(header::AUTHORIZATION, "Basic !!!notbase64!!!");
        assert!(basic_credentials(&headers).is_none());
    }

    #[test]
    fn session_cookies_preserve_order_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(
            header::COOKIE,
            HeaderValue::from_static("gatekey-token=first; other=x; gatekey-token=second"),
        );
        headers.append(
            header::COOKIE,
            HeaderValue::from_static("gatekey-token=third"),
        );
        let cookies = session_cookies(&headers, "gatekey-token");
        assert_eq!(cookies, vec!["first", "second", "third"]);
    }

    #[test]
    fn session_cookies_ignore_other_names() {
        let headers = headers_with(header::COOKIE, "session=abc; theme=dark");
        assert!(session_cookies(&headers, "gatekey-token").is_empty());
    }
}
