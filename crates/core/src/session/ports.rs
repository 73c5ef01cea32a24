//! Port interfaces for the remote session endpoints
//!
//! The HTTP transport and request shaping live outside this crate; these
//! traits are the only contract the session manager relies on.

use async_trait::async_trait;
use authsync_domain::{AuthData, AuthResult, SessionTokens};

/// Remote session operations.
#[async_trait]
pub trait SessionAuthenticator: Send + Sync {
    /// Re-authenticate an existing session, optionally extending its
    /// lifetime to `session_duration_minutes`.
    async fn authenticate(
        &self,
        tokens: SessionTokens,
        session_duration_minutes: Option<u32>,
    ) -> AuthResult<AuthData>;

    /// Revoke the session server-side.
    async fn revoke(&self, tokens: SessionTokens) -> AuthResult<()>;
}
