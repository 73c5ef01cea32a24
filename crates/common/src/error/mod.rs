//! Error classification shared across AuthSync crates
//!
//! Every error type in the workspace can describe itself through
//! [`ErrorClassification`]: whether retrying makes sense, how loudly it
//! should be reported, and whether it needs immediate attention.
//!
//! ```rust
//! use authsync_common::error::{ErrorClassification, ErrorSeverity};
//! use authsync_domain::AuthError;
//!
//! let err = AuthError::unreachable("connection reset", None);
//! assert!(err.is_retryable());
//! assert_eq!(err.severity(), ErrorSeverity::Warning);
//! ```

use std::fmt;
use std::time::Duration;

use authsync_domain::{ApiError, ApiErrorType, AuthError};

/// Trait for classifying errors by their characteristics
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient issues that may succeed if attempted
    /// again, such as network timeouts, rate limiting or temporary service
    /// unavailability.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    ///
    /// Used for logging decisions.
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool;

    /// Get the suggested retry delay if applicable
    fn retry_after(&self) -> Option<Duration>;
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Suggested wait before retrying a rate-limited request.
const RATE_LIMIT_RETRY_AFTER: Duration = Duration::from_secs(1);

fn is_rate_limited(err: &ApiError) -> bool {
    err.status_code == 429
        || matches!(err.error_type, ApiErrorType::TooManyRequests | ApiErrorType::RateLimited)
}

impl ErrorClassification for ApiError {
    fn is_retryable(&self) -> bool {
        is_rate_limited(self) || self.status_code >= 500
    }

    fn severity(&self) -> ErrorSeverity {
        if self.status_code >= 500 {
            ErrorSeverity::Error
        } else {
            ErrorSeverity::Warning
        }
    }

    fn is_critical(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        is_rate_limited(self).then_some(RATE_LIMIT_RETRY_AFTER)
    }
}

impl ErrorClassification for AuthError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Api(err) => err.is_retryable(),
            Self::MalformedResponse { .. } | Self::TransportUnreachable { .. } => true,
            Self::Usage { .. } | Self::CredentialMissing | Self::Storage { .. } => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Api(err) => err.severity(),
            Self::MalformedResponse { .. } => ErrorSeverity::Error,
            Self::TransportUnreachable { .. } | Self::CredentialMissing => ErrorSeverity::Warning,
            Self::Usage { .. } => ErrorSeverity::Info,
            Self::Storage { .. } => ErrorSeverity::Critical,
        }
    }

    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Api(err) => err.retry_after(),
            _ => None,
        }
    }
}
