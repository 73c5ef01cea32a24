//! Failure classification
//!
//! Turns whatever the transport layer produced into an [`AuthError`], and
//! decides which API errors mean the session is gone for good.
//!
//! Classification order:
//! 1. a response with a parsable structured error body becomes
//!    [`AuthError::Api`], keeping status code and error type verbatim;
//! 2. a response whose body cannot be parsed becomes
//!    [`AuthError::MalformedResponse`];
//! 3. anything that never produced a response becomes
//!    [`AuthError::TransportUnreachable`], keeping the cause.

use std::collections::HashSet;
use std::sync::Arc;

use authsync_domain::constants::DEFAULT_UNRECOVERABLE_ERROR_TYPES;
use authsync_domain::{
    ApiError, ApiErrorBody, ApiErrorType, AuthError, AuthResult, ErrorCause, SessionConfig,
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Header carrying the server-assigned request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Raw failure as seen by the transport layer, before classification.
#[derive(Debug, Clone)]
pub enum TransportFailure {
    /// The server answered with a non-success status.
    Response { status: u16, body: String, request_id: Option<String> },
    /// A body arrived but could not be read or decoded.
    Decode { message: String },
    /// No response reached the caller.
    Unreachable { message: String, cause: Option<ErrorCause> },
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() || err.is_body() {
            return Self::Decode { message: err.to_string() };
        }
        if let Some(status) = err.status() {
            return Self::Decode {
                message: format!("HTTP {} without a readable error body", status.as_u16()),
            };
        }
        Self::Unreachable { message: err.to_string(), cause: Some(Arc::new(err)) }
    }
}

/// Maps transport failures to [`AuthError`] and flags unrecoverable ones.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    unrecoverable: HashSet<ApiErrorType>,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_UNRECOVERABLE_ERROR_TYPES.iter().copied())
    }
}

impl ErrorClassifier {
    /// Build a classifier from a list of server error codes.
    ///
    /// Codes that do not map to a known [`ApiErrorType`] are dropped with a
    /// warning, so an unknown code can never destroy a session.
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unrecoverable = HashSet::new();
        for code in codes {
            let parsed = ApiErrorType::from(code.as_ref());
            if parsed.is_known() {
                unrecoverable.insert(parsed);
            } else {
                warn!(error_type = %code.as_ref(), "Ignoring unknown unrecoverable error type");
            }
        }
        Self { unrecoverable }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(&config.unrecoverable_error_types)
    }

    /// Classify a raw transport failure.
    pub fn classify(&self, failure: TransportFailure) -> AuthError {
        match failure {
            TransportFailure::Response { status, body, request_id } => {
                match serde_json::from_str::<ApiErrorBody>(&body) {
                    Ok(mut parsed) => {
                        if parsed.status_code == 0 {
                            parsed.status_code = status;
                        }
                        if parsed.request_id.is_none() {
                            parsed.request_id = request_id;
                        }
                        AuthError::Api(ApiError::from(parsed))
                    }
                    Err(err) => {
                        debug!(status, error = %err, "Error response body did not parse");
                        AuthError::malformed(format!("HTTP {status}: unparsable error body: {err}"))
                    }
                }
            }
            TransportFailure::Decode { message } => AuthError::malformed(message),
            TransportFailure::Unreachable { message, cause } => {
                AuthError::unreachable(message, cause)
            }
        }
    }

    /// `true` only for API errors on the unrecoverable allow-list.
    #[must_use]
    pub fn is_unrecoverable(&self, err: &AuthError) -> bool {
        match err {
            AuthError::Api(api) => self.unrecoverable.contains(&api.error_type),
            _ => false,
        }
    }

    /// The configured unrecoverable codes, sorted.
    #[must_use]
    pub fn unrecoverable_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.unrecoverable.iter().map(ApiErrorType::as_str).collect();
        codes.sort_unstable();
        codes
    }

    /// Run the full pipeline over a `reqwest` send result.
    ///
    /// 2xx bodies are parsed as `T`; anything else is classified.
    pub async fn read_json<T: DeserializeOwned>(
        &self,
        sent: Result<reqwest::Response, reqwest::Error>,
    ) -> AuthResult<T> {
        let response = sent.map_err(|err| self.classify(err.into()))?;
        let status = response.status();
        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let body = response.text().await.map_err(|err| self.classify(err.into()))?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|err| {
                AuthError::malformed(format!("Failed to parse response body: {err}"))
            })
        } else {
            Err(self.classify(TransportFailure::Response {
                status: status.as_u16(),
                body,
                request_id,
            }))
        }
    }
}
