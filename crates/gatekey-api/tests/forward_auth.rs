//! End-to-end exercises of the forward-auth router: the login handshake,
//! the transparent proxy check, cookie handling and the diagnostics routes.

use argon2::Argon2;
use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{Duration, Utc};
use gatekey_api::ApiServer;
use gatekey_core::{CredentialStore, DecisionEngine, EngineOptions, SECRET_LEN, Secret, Token};
use gatekey_telemetry::Metrics;
use tower::ServiceExt;

const LOGIN_PAGE: &[u8] = b"<html>please log in</html>";
const COOKIE_NAME: &str = "gatekey-token";
const HEADER_LOGIN: &str = "x-gatekey-login";
const HEADER_DOMAIN: &str = "x-gatekey-domain";
const HEADER_USERNAME: &str = "x-gatekey-username";
const HEADER_AUTH_OUTCOME: &str = "x-gatekey-authentication";

fn secret() -> Secret {
    Secret::from_bytes(&[0u8; SECRET_LEN]).expect("64 bytes suffice")
}

fn server() -> ApiServer {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(b"wonderland", &salt)
        .expect("hashing test password must succeed")
        .to_string();
    let store = CredentialStore::from_iter([("alice".to_string(), hash)]);
    let engine = DecisionEngine::new(secret(), store, EngineOptions::default());
    ApiServer::new(
        engine,
        LOGIN_PAGE.to_vec(),
        Metrics::new().expect("metrics registry must build"),
    )
}

async fn send(server: &ApiServer, request: Request<Body>) -> Response {
    server
        .router()
        .oneshot(request)
        .await
        .expect("router is infallible")
}

fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

fn login_request(username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .uri("/")
        .header(header::AUTHORIZATION, basic_auth(username, password))
        .header(HEADER_LOGIN, "true")
        .body(Body::empty())
        .expect("request builds")
}

fn cookie_token(response: &Response) -> String {
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie present")
        .to_str()
        .expect("set-cookie is ascii");
    cookie
        .strip_prefix(&format!("{COOKIE_NAME}="))
        .and_then(|rest| rest.split(';').next())
        .expect("cookie carries the token")
        .to_string()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads")
        .to_vec()
}

#[tokio::test]
async fn login_handshake_end_to_end() {
    let server = server();

    // Step 1: login with Basic credentials and login intent.
    let response = send(&server, login_request("alice", "wonderland")).await;
    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(
        response.headers().get(HEADER_AUTH_OUTCOME).unwrap(),
        "succeeded"
    );
    assert_eq!(response.headers().get(HEADER_USERNAME).unwrap(), "alice");
    let token_value = cookie_token(&response);
    let token = Token::parse(&token_value).expect("issued token parses");
    assert!(token.verify(&secret(), Utc::now()));
    assert_eq!(token.username(), "alice");
    assert_eq!(body_bytes(response).await, LOGIN_PAGE);

    // Step 2: replay the cookie on a transparent check.
    let response = send(
        &server,
        Request::builder()
            .uri("/protected/resource")
            .header(header::COOKIE, format!("{COOKIE_NAME}={token_value}"))
            .body(Body::empty())
            .expect("request builds"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(HEADER_USERNAME).unwrap(), "alice");
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(body_bytes(response).await.is_empty());

    // Step 3: an expired token is denied like any other failure.
    let expired = Token::issue(&secret(), "alice", Utc::now() - Duration::seconds(1));
    let response = send(
        &server,
        Request::builder()
            .uri("/protected/resource")
            .header(header::COOKIE, format!("{COOKIE_NAME}={expired}"))
            .body(Body::empty())
            .expect("request builds"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(HEADER_AUTH_OUTCOME).unwrap(),
        "failed"
    );
    assert_eq!(body_bytes(response).await, LOGIN_PAGE);
}

#[tokio::test]
async fn check_with_credentials_but_no_login_intent_sets_no_cookie() {
    let server = server();
    let response = send(
        &server,
        Request::builder()
            .uri("/")
            .header(header::AUTHORIZATION, basic_auth("alice", "wonderland"))
            .body(Body::empty())
            .expect("request builds"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn anonymous_api_client_gets_basic_challenge() {
    let server = server();
    let response = send(
        &server,
        Request::builder()
            .uri("/")
            .header(header::ACCEPT, "application/json")
            .body(Body::empty())
            .expect("request builds"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let challenges: Vec<_> = response
        .headers()
        .get_all(header::WWW_AUTHENTICATE)
        .iter()
        .map(|value| value.to_str().expect("ascii").to_string())
        .collect();
    assert_eq!(challenges.len(), 2, "login scheme plus Basic fallback");
    assert!(challenges[0].contains("Gatekey-Login"));
    assert!(challenges[1].starts_with("Basic"));
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap(),
        "text/html; charset=utf-8"
    );
    assert_eq!(body_bytes(response).await, LOGIN_PAGE);
}

#[tokio::test]
async fn anonymous_browser_gets_login_form_only() {
    let server = server();
    let response = send(
        &server,
        Request::builder()
            .uri("/")
            .header(header::ACCEPT, "text/html,application/xhtml+xml")
            .body(Body::empty())
            .expect("request builds"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let challenges: Vec<_> = response
        .headers()
        .get_all(header::WWW_AUTHENTICATE)
        .iter()
        .collect();
    assert_eq!(challenges.len(), 1, "browsers must not see a Basic challenge");
}

#[tokio::test]
async fn wrong_password_and_unknown_user_are_indistinguishable() {
    let server = server();
    let wrong = send(&server, login_request("alice", "looking-glass")).await;
    let unknown = send(&server, login_request("eve", "wonderland")).await;

    assert_eq!(wrong.status(), unknown.status());
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    for response in [&wrong, &unknown] {
        assert_eq!(
            response.headers().get(HEADER_AUTH_OUTCOME).unwrap(),
            "failed"
        );
        assert!(response.headers().get(HEADER_USERNAME).is_none());
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }
    assert_eq!(body_bytes(wrong).await, body_bytes(unknown).await);
}

#[tokio::test]
async fn forged_cookie_before_valid_cookie_still_authenticates() {
    let server = server();
    let other = Secret::from_bytes(&[9u8; SECRET_LEN]).expect("64 bytes suffice");
    let forged = Token::issue(&other, "mallory", Utc::now() + Duration::hours(1));
    let valid = Token::issue(&secret(), "alice", Utc::now() + Duration::hours(1));
    let response = send(
        &server,
        Request::builder()
            .uri("/")
            .header(
                header::COOKIE,
                format!("{COOKIE_NAME}={forged}; {COOKIE_NAME}={valid}"),
            )
            .body(Body::empty())
            .expect("request builds"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(HEADER_USERNAME).unwrap(), "alice");
}

#[tokio::test]
async fn domain_override_scopes_the_issued_cookie() {
    let server = server();
    let mut request = login_request("alice", "wonderland");
    request.headers_mut().insert(
        HEADER_DOMAIN,
        header::HeaderValue::from_static("example.org"),
    );
    let response = send(&server, request).await;
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.ends_with("; Domain=example.org"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Secure"));
}

#[tokio::test]
async fn healthz_reports_store_and_uptime() {
    let server = server();
    let response = send(
        &server,
        Request::builder()
            .uri("/healthz")
            .body(Body::empty())
            .expect("request builds"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value =
        serde_json::from_slice(&body_bytes(response).await).expect("health body is JSON");
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["users"], 1);
    assert_eq!(body["secret_set"], true);
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn metrics_expose_auth_counters() {
    let server = server();
    let _ = send(&server, login_request("alice", "wonderland")).await;
    let response = send(
        &server,
        Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .expect("request builds"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = String::from_utf8(body_bytes(response).await).expect("exposition is UTF-8");
    assert!(text.contains("auth_attempts_total"));
    assert!(text.contains("tokens_issued_total"));
    assert!(text.contains("http_requests_total"));
}
