//! Error types used throughout the session manager
//!
//! [`AuthError`] is the single failure vocabulary every network-facing
//! operation returns. Callers branch on its variants; only the refresh engine
//! cares about the finer "unrecoverable" distinction, which is computed by the
//! classifier in `authsync-core` from [`ApiErrorType`].

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::impl_error_code_conversions;

/// Message used when an operation needs a session and none is cached.
pub const NO_CURRENT_SESSION_MESSAGE: &str = "There is no session currently available.";

/// Message used when a redirect exchange finds no stored PKCE pair.
pub const MISSING_PKCE_MESSAGE: &str = "The PKCE code challenge or code verifier is missing. \
     Make sure this flow is completed on the same device on which it was started.";

/// Machine-readable error codes returned by the authentication service.
///
/// The list is intentionally closed: codes the client does not know about
/// parse to [`ApiErrorType::Unknown`] and keep their original text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ApiErrorType {
    SessionNotFound,
    SessionRevoked,
    InvalidSessionToken,
    InvalidSessionId,
    UnauthorizedCredentials,
    UserUnauthenticated,
    InvalidSecretAuthentication,
    UserNotFound,
    MemberNotFound,
    PkceMismatch,
    InvalidPkceCodeVerifier,
    TooManyRequests,
    RateLimited,
    InternalServerError,
    /// Any code not listed above.
    Unknown(String),
}

impl_error_code_conversions!(ApiErrorType {
    SessionNotFound => "session_not_found",
    SessionRevoked => "session_revoked",
    InvalidSessionToken => "invalid_session_token",
    InvalidSessionId => "invalid_session_id",
    UnauthorizedCredentials => "unauthorized_credentials",
    UserUnauthenticated => "user_unauthenticated",
    InvalidSecretAuthentication => "invalid_secret_authentication",
    UserNotFound => "user_not_found",
    MemberNotFound => "member_not_found",
    PkceMismatch => "pkce_mismatch",
    InvalidPkceCodeVerifier => "invalid_pkce_code_verifier",
    TooManyRequests => "too_many_requests",
    RateLimited => "rate_limited",
    InternalServerError => "internal_server_error",
});

impl Serialize for ApiErrorType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ApiErrorType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw))
    }
}

/// Structured error body returned by the authentication service.
///
/// Wire shape:
/// `{"status_code": 404, "request_id": "...", "error_type": "...",
/// "error_message": "...", "error_url": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Zero when the body omitted it; the classifier fills in the HTTP status.
    #[serde(default)]
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub error_type: String,
    pub error_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_url: Option<String>,
}

/// A server-side failure with a machine-readable error code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub request_id: Option<String>,
    pub error_type: ApiErrorType,
    /// The `error_type` string exactly as the server sent it.
    pub raw_error_type: String,
    pub message: String,
    pub status_code: u16,
    pub error_url: Option<String>,
}

impl From<ApiErrorBody> for ApiError {
    fn from(body: ApiErrorBody) -> Self {
        Self {
            request_id: body.request_id,
            error_type: ApiErrorType::from(body.error_type.as_str()),
            raw_error_type: body.error_type,
            message: body.error_message,
            status_code: body.status_code,
            error_url: body.error_url,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.raw_error_type, self.status_code, self.message)?;
        if let Some(request_id) = &self.request_id {
            write!(f, " [request_id: {request_id}]")?;
        }
        Ok(())
    }
}

/// Shared, cloneable handle to the low-level cause of a transport failure.
pub type ErrorCause = Arc<dyn StdError + Send + Sync>;

/// Every way an authentication operation can fail.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The service answered with a structured error body.
    #[error("API error: {0}")]
    Api(ApiError),

    /// A response arrived but could not be parsed into the expected shape.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// No response reached the caller (DNS, timeout, connection failure).
    #[error("Service unreachable: {message}")]
    TransportUnreachable {
        message: String,
        #[source]
        cause: Option<ErrorCause>,
    },

    /// The caller misused the API locally; nothing was sent.
    #[error("Usage error: {message}")]
    Usage { message: String },

    /// A PKCE exchange was attempted without a stored code pair.
    #[error("{}", MISSING_PKCE_MESSAGE)]
    CredentialMissing,

    /// The secure store could not be read or written.
    #[error("Secure storage error: {message}")]
    Storage { message: String },
}

impl AuthError {
    /// Build a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage { message: message.into() }
    }

    /// The usage error returned when an operation requires a session.
    #[must_use]
    pub fn no_current_session() -> Self {
        Self::usage(NO_CURRENT_SESSION_MESSAGE)
    }

    /// Build a malformed-response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse { message: message.into() }
    }

    /// Build a transport error, keeping the underlying cause.
    pub fn unreachable(message: impl Into<String>, cause: Option<ErrorCause>) -> Self {
        Self::TransportUnreachable { message: message.into(), cause }
    }

    /// Build a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage { message: message.into() }
    }

    /// The structured API error, if this is one.
    #[must_use]
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// `true` for failures detected locally without touching the network.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Usage { .. } | Self::CredentialMissing | Self::Storage { .. })
    }

    /// Stable label suitable for structured log fields.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Api(_) => "api",
            Self::MalformedResponse { .. } => "malformed_response",
            Self::TransportUnreachable { .. } => "transport_unreachable",
            Self::Usage { .. } => "usage",
            Self::CredentialMissing => "credential_missing",
            Self::Storage { .. } => "storage",
        }
    }
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        Self::Api(err)
    }
}

/// Outcome of every asynchronous, network-touching operation.
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Configuration loading and validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid {format} format: {message}")]
    Parse { format: String, message: String },

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to read config file: {0}")]
    Io(String),
}
