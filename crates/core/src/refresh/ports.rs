//! Collaborators the refresh loop drives

use std::future::Future;

use async_trait::async_trait;
use authsync_domain::{AuthData, AuthResult};

/// Everything the refresh loop needs from the outside world.
#[async_trait]
pub trait RefreshHandler: Send + Sync {
    /// Re-authenticate the current session with the remote service.
    async fn refresh(&self) -> AuthResult<AuthData>;

    /// Persist a successful refresh.
    async fn commit(&self, data: AuthData) -> AuthResult<()>;

    /// Destroy the local session after an unrecoverable error.
    async fn clear(&self) -> AuthResult<()>;

    /// Id of the session currently cached, used to detect replacement.
    /// `None` ends the loop.
    fn current_session_id(&self) -> Option<String>;
}

/// Adapts four closures to [`RefreshHandler`].
pub struct RefreshHooks<R, C, X, S> {
    refresh: R,
    commit: C,
    clear: X,
    current_session_id: S,
}

impl<R, C, X, S> RefreshHooks<R, C, X, S> {
    pub fn new(refresh: R, commit: C, clear: X, current_session_id: S) -> Self {
        Self { refresh, commit, clear, current_session_id }
    }
}

#[async_trait]
impl<R, RF, C, CF, X, XF, S> RefreshHandler for RefreshHooks<R, C, X, S>
where
    R: Fn() -> RF + Send + Sync,
    RF: Future<Output = AuthResult<AuthData>> + Send + 'static,
    C: Fn(AuthData) -> CF + Send + Sync,
    CF: Future<Output = AuthResult<()>> + Send + 'static,
    X: Fn() -> XF + Send + Sync,
    XF: Future<Output = AuthResult<()>> + Send + 'static,
    S: Fn() -> Option<String> + Send + Sync,
{
    async fn refresh(&self) -> AuthResult<AuthData> {
        (self.refresh)().await
    }

    async fn commit(&self, data: AuthData) -> AuthResult<()> {
        (self.commit)(data).await
    }

    async fn clear(&self) -> AuthResult<()> {
        (self.clear)().await
    }

    fn current_session_id(&self) -> Option<String> {
        (self.current_session_id)()
    }
}
