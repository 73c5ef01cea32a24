//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! workspace.

// Secure store keys for the cached session
pub const SESSION_TOKENS_KEY: &str = "session_tokens";
pub const SESSION_DATA_KEY: &str = "session_data";
pub const PRINCIPAL_DATA_KEY: &str = "principal_data";
pub const LAST_VALIDATED_AT_KEY: &str = "last_validated_at";

// Secure store keys for the outstanding PKCE pair
pub const PKCE_CODE_VERIFIER_KEY: &str = "pkce_code_verifier";
pub const PKCE_CODE_CHALLENGE_KEY: &str = "pkce_code_challenge";

/// Service name used for keychain entries when none is configured.
pub const DEFAULT_SERVICE_NAME: &str = "authsync";

// Background refresh cadence
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 180;
pub const DEFAULT_BACKOFF_UNIT_MS: u64 = 1_000;
pub const DEFAULT_BACKOFF_JITTER_MS: u64 = 17;
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 32_000;
/// Longest stretch of consecutive failures before the loop gives up.
pub const DEFAULT_MAX_BACKOFF_WINDOW_SECS: u64 = 120;

/// Server error codes that mean the session no longer exists.
pub const DEFAULT_UNRECOVERABLE_ERROR_TYPES: &[&str] = &[
    "session_not_found",
    "unauthorized_credentials",
    "user_unauthenticated",
    "invalid_secret_authentication",
    "session_revoked",
];

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "AUTHSYNC_";
