//! Session types
//!
//! A session is identified to the remote service by two credentials: an
//! opaque bearer token and a signed session JWT. They are always stored and
//! cleared together as a [`SessionTokens`] record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::principal::Principal;

/// Server-side session metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub principal_id: String,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    /// Opaque roles or claims attached to the session.
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Session {
    /// `true` once `expires_at` is at or before `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// `true` when `expires_at` is strictly after `started_at`.
    #[must_use]
    pub fn has_valid_lifetime(&self) -> bool {
        self.expires_at > self.started_at
    }
}

/// The credential pair identifying a session to the remote service.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub session_token: String,
    pub session_jwt: String,
}

impl SessionTokens {
    #[must_use]
    pub fn new(session_token: impl Into<String>, session_jwt: impl Into<String>) -> Self {
        Self { session_token: session_token.into(), session_jwt: session_jwt.into() }
    }

    /// Both halves present and non-empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.session_token.is_empty() && !self.session_jwt.is_empty()
    }
}

// Tokens are bearer secrets.
impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("session_token", &"<redacted>")
            .field("session_jwt", &"<redacted>")
            .finish()
    }
}

/// Payload of a successful authentication or session refresh.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthData {
    pub session_token: String,
    pub session_jwt: String,
    pub session: Session,
    #[serde(default, alias = "user", alias = "member")]
    pub principal: Option<Principal>,
}

impl AuthData {
    /// The credential pair carried by this payload.
    #[must_use]
    pub fn tokens(&self) -> SessionTokens {
        SessionTokens::new(self.session_token.clone(), self.session_jwt.clone())
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session.session_id
    }
}

impl std::fmt::Debug for AuthData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthData")
            .field("session_token", &"<redacted>")
            .field("session_jwt", &"<redacted>")
            .field("session", &self.session)
            .field("principal", &self.principal)
            .finish()
    }
}
