//! Integration tests for failure classification over real HTTP.
//!
//! A small reqwest-backed `SessionAuthenticator` talks to a wiremock server,
//! so every response shape goes through `ErrorClassifier::read_json`.

mod support;

use std::error::Error as _;
use std::sync::Arc;

use async_trait::async_trait;
use authsync_common::testing::MockSecureStore;
use authsync_common::ErrorClassification;
use authsync_core::{ErrorClassifier, SessionAuthenticator, SessionManager};
use authsync_domain::{ApiErrorType, AuthData, AuthError, AuthResult, SessionConfig, SessionTokens};
use serde_json::json;
use support::fixtures;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct HttpAuthenticator {
    client: reqwest::Client,
    base_url: String,
    classifier: ErrorClassifier,
}

impl HttpAuthenticator {
    fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            classifier: ErrorClassifier::default(),
        }
    }
}

#[async_trait]
impl SessionAuthenticator for HttpAuthenticator {
    async fn authenticate(
        &self,
        tokens: SessionTokens,
        session_duration_minutes: Option<u32>,
    ) -> AuthResult<AuthData> {
        let sent = self
            .client
            .post(format!("{}/sessions/authenticate", self.base_url))
            .json(&json!({
                "session_token": tokens.session_token,
                "session_duration_minutes": session_duration_minutes,
            }))
            .send()
            .await;
        self.classifier.read_json(sent).await
    }

    async fn revoke(&self, tokens: SessionTokens) -> AuthResult<()> {
        let sent = self
            .client
            .post(format!("{}/sessions/revoke", self.base_url))
            .json(&json!({ "session_token": tokens.session_token }))
            .send()
            .await;
        self.classifier.read_json::<serde_json::Value>(sent).await.map(|_| ())
    }
}

fn error_json(status_code: u16, error_type: &str) -> serde_json::Value {
    json!({
        "status_code": status_code,
        "error_type": error_type,
        "error_message": format!("{error_type} from mock server"),
        "error_url": "https://docs.example.com/errors",
    })
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("POST")).and(path(route)).respond_with(response).mount(server).await;
}

#[tokio::test]
async fn test_success_body_is_parsed() {
    let server = MockServer::start().await;
    let data = fixtures::auth_data("session-http-1");
    Mock::given(method("POST"))
        .and(path("/sessions/authenticate"))
        .and(body_partial_json(json!({ "session_duration_minutes": 30 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&data))
        .mount(&server)
        .await;

    let authenticator = HttpAuthenticator::new(server.uri());
    let parsed =
        authenticator.authenticate(fixtures::tokens("session-http-1"), Some(30)).await.unwrap();

    assert_eq!(parsed, data);
}

/// Validates `ErrorClassifier::read_json` for the structured 404 scenario.
///
/// Assertions:
/// - Ensures the body becomes `AuthError::Api` with type and status intact.
/// - Ensures the request id falls back to the response header.
/// - Ensures `session_not_found` is unrecoverable.
#[tokio::test]
async fn test_structured_error_body() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/sessions/authenticate",
        ResponseTemplate::new(404)
            .set_body_json(error_json(404, "session_not_found"))
            .insert_header("x-request-id", "request-id-live-7"),
    )
    .await;

    let authenticator = HttpAuthenticator::new(server.uri());
    let err = authenticator.authenticate(fixtures::tokens("gone"), None).await.unwrap_err();

    let api = err.as_api_error().expect("structured error");
    assert_eq!(api.error_type, ApiErrorType::SessionNotFound);
    assert_eq!(api.raw_error_type, "session_not_found");
    assert_eq!(api.status_code, 404);
    assert_eq!(api.request_id.as_deref(), Some("request-id-live-7"));
    assert_eq!(api.error_url.as_deref(), Some("https://docs.example.com/errors"));
    assert!(authenticator.classifier.is_unrecoverable(&err));
}

#[tokio::test]
async fn test_body_status_is_kept_verbatim() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/sessions/authenticate",
        ResponseTemplate::new(400).set_body_json(error_json(401, "unauthorized_credentials")),
    )
    .await;

    let authenticator = HttpAuthenticator::new(server.uri());
    let err = authenticator.authenticate(fixtures::tokens("s"), None).await.unwrap_err();

    assert_eq!(err.as_api_error().map(|api| api.status_code), Some(401));
    assert!(authenticator.classifier.is_unrecoverable(&err));
}

#[tokio::test]
async fn test_rate_limit_is_recoverable_and_retryable() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/sessions/authenticate",
        ResponseTemplate::new(429).set_body_json(error_json(429, "rate_limited")),
    )
    .await;

    let authenticator = HttpAuthenticator::new(server.uri());
    let err = authenticator.authenticate(fixtures::tokens("s"), None).await.unwrap_err();

    assert!(matches!(err, AuthError::Api(_)));
    assert!(!authenticator.classifier.is_unrecoverable(&err));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_unknown_error_code_is_never_unrecoverable() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/sessions/authenticate",
        ResponseTemplate::new(400).set_body_json(error_json(400, "brand_new_failure")),
    )
    .await;

    let authenticator = HttpAuthenticator::new(server.uri());
    let err = authenticator.authenticate(fixtures::tokens("s"), None).await.unwrap_err();

    let api = err.as_api_error().expect("structured error");
    assert_eq!(api.error_type, ApiErrorType::Unknown("brand_new_failure".to_string()));
    assert_eq!(api.raw_error_type, "brand_new_failure");
    assert!(!authenticator.classifier.is_unrecoverable(&err));
}

#[tokio::test]
async fn test_unparsable_error_body_is_malformed() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/sessions/authenticate",
        ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"),
    )
    .await;

    let authenticator = HttpAuthenticator::new(server.uri());
    let err = authenticator.authenticate(fixtures::tokens("s"), None).await.unwrap_err();

    assert!(matches!(err, AuthError::MalformedResponse { .. }), "got {err:?}");
    assert!(err.to_string().contains("502"));
    assert!(!authenticator.classifier.is_unrecoverable(&err));
}

#[tokio::test]
async fn test_malformed_success_body() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/sessions/authenticate",
        ResponseTemplate::new(200).set_body_json(json!({ "session_token": 42 })),
    )
    .await;

    let authenticator = HttpAuthenticator::new(server.uri());
    let err = authenticator.authenticate(fixtures::tokens("s"), None).await.unwrap_err();

    assert!(matches!(err, AuthError::MalformedResponse { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_unreachable_server_keeps_cause() {
    // Bind then drop a listener to get a port nothing is serving.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let authenticator = HttpAuthenticator::new(format!("http://{addr}"));
    let err = authenticator.authenticate(fixtures::tokens("s"), None).await.unwrap_err();

    assert!(matches!(err, AuthError::TransportUnreachable { cause: Some(_), .. }), "got {err:?}");
    assert!(err.source().is_some());
    assert!(!authenticator.classifier.is_unrecoverable(&err));
}

#[tokio::test]
async fn test_manager_clears_session_when_revoke_finds_it_gone() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/sessions/revoke",
        ResponseTemplate::new(404).set_body_json(error_json(404, "session_not_found")),
    )
    .await;

    let manager = SessionManager::new(
        SessionConfig::default(),
        Arc::new(MockSecureStore::new()),
        Arc::new(HttpAuthenticator::new(server.uri())),
    );
    manager.handle_auth_result(Ok(fixtures::auth_data("session-http-2"))).await.unwrap();

    let err = manager.revoke(false).await.unwrap_err();
    assert!(matches!(err, AuthError::Api(_)));
    assert!(!manager.has_valid_session());
    assert!(!manager.refresh_status().is_running());
}

#[tokio::test]
async fn test_manager_keeps_session_when_revoke_is_unreachable() {
    let server = MockServer::start().await;
    mount(&server, "/sessions/revoke", ResponseTemplate::new(503).set_body_string("")).await;

    let manager = SessionManager::new(
        SessionConfig::default(),
        Arc::new(MockSecureStore::new()),
        Arc::new(HttpAuthenticator::new(server.uri())),
    );
    manager.handle_auth_result(Ok(fixtures::auth_data("session-http-3"))).await.unwrap();

    let err = manager.revoke(false).await.unwrap_err();
    assert!(matches!(err, AuthError::MalformedResponse { .. }));
    assert!(manager.has_valid_session());

    manager.shutdown();
}
