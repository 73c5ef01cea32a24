//! Session, principal and error fixtures

use authsync_domain::{
    ApiError, ApiErrorBody, AuthData, AuthError, Principal, Session, SessionTokens,
};
use chrono::{Duration, Utc};

pub const PRINCIPAL_ID: &str = "user-test-41f4";

pub fn session(session_id: &str) -> Session {
    let started_at = Utc::now();
    Session {
        session_id: session_id.to_string(),
        principal_id: PRINCIPAL_ID.to_string(),
        started_at,
        expires_at: started_at + Duration::minutes(60),
        last_accessed_at: started_at,
        roles: vec!["member".to_string()],
    }
}

pub fn principal() -> Principal {
    Principal {
        principal_id: PRINCIPAL_ID.to_string(),
        email: Some("ada@example.com".to_string()),
        display_name: Some("Ada".to_string()),
        status: Some("active".to_string()),
        trusted_metadata: serde_json::json!({ "plan": "pro" }),
    }
}

/// Payload for `session_id` with tokens derived from the id.
pub fn auth_data(session_id: &str) -> AuthData {
    auth_data_with_token(session_id, &format!("token-{session_id}"))
}

pub fn auth_data_with_token(session_id: &str, session_token: &str) -> AuthData {
    AuthData {
        session_token: session_token.to_string(),
        session_jwt: format!("jwt-{session_id}"),
        session: session(session_id),
        principal: Some(principal()),
    }
}

pub fn tokens(session_id: &str) -> SessionTokens {
    SessionTokens::new(format!("token-{session_id}"), format!("jwt-{session_id}"))
}

/// Structured server error with the given code and status.
pub fn api_error(error_type: &str, status_code: u16) -> AuthError {
    AuthError::from(ApiError::from(ApiErrorBody {
        status_code,
        request_id: Some("request-id-test-1".to_string()),
        error_type: error_type.to_string(),
        error_message: format!("{error_type} raised by test"),
        error_url: None,
    }))
}

pub fn session_not_found() -> AuthError {
    api_error("session_not_found", 404)
}

/// A recoverable network failure.
pub fn unreachable() -> AuthError {
    AuthError::unreachable("connection reset by peer", None)
}
