//! Session manager - the entry point product flows and the UI talk to
//!
//! Construct one per process and share it behind an `Arc`. It owns the
//! session store, the PKCE manager and the refresh engine, and wires them
//! together:
//!
//! - every new sign-in goes through [`SessionManager::handle_auth_result`],
//!   which stores the session and (re)starts background refresh;
//! - re-authentication and background refresh only ever write back or clear
//!   the session they started from;
//! - local state is cleared, and refresh stopped, on logout or when the server
//!   rejects the session.

use std::sync::Arc;

use async_trait::async_trait;
use authsync_common::security::SecureStore;
use authsync_domain::{
    AuthData, AuthError, AuthResult, PkceCodePair, Principal, Session, SessionConfig,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::ports::SessionAuthenticator;
use super::store::SessionStore;
use crate::classifier::ErrorClassifier;
use crate::pkce::PkceManager;
use crate::refresh::{RefreshConfig, RefreshEngine, RefreshExit, RefreshHandler, RefreshStatus};

/// Bridges the refresh engine to the store and the remote authenticator.
struct SessionRefresher {
    store: Arc<SessionStore>,
    authenticator: Arc<dyn SessionAuthenticator>,
}

#[async_trait]
impl RefreshHandler for SessionRefresher {
    async fn refresh(&self) -> AuthResult<AuthData> {
        let tokens = self.store.tokens().ok_or_else(AuthError::no_current_session)?;
        self.authenticator.authenticate(tokens, None).await
    }

    async fn commit(&self, data: AuthData) -> AuthResult<()> {
        if !self.store.refresh_session(&data)? {
            debug!(session_id = %data.session_id(), "Refreshed session no longer current");
        }
        Ok(())
    }

    async fn clear(&self) -> AuthResult<()> {
        self.store.revoke()
    }

    fn current_session_id(&self) -> Option<String> {
        self.store.current_session_id()
    }
}

pub struct SessionManager {
    config: SessionConfig,
    store: Arc<SessionStore>,
    pkce: PkceManager,
    classifier: Arc<ErrorClassifier>,
    engine: RefreshEngine,
    authenticator: Arc<dyn SessionAuthenticator>,
}

impl SessionManager {
    pub fn new(
        config: SessionConfig,
        secure_store: Arc<dyn SecureStore>,
        authenticator: Arc<dyn SessionAuthenticator>,
    ) -> Self {
        let classifier = Arc::new(ErrorClassifier::from_config(&config));
        let engine =
            RefreshEngine::new(RefreshConfig::from(&config.refresh), Arc::clone(&classifier));

        Self {
            store: Arc::new(SessionStore::new(Arc::clone(&secure_store))),
            pkce: PkceManager::new(secure_store),
            classifier,
            engine,
            authenticator,
            config,
        }
    }

    /// Hydrate the store from secure storage and resume background refresh
    /// if a live session was persisted.
    pub async fn initialize(&self) -> AuthResult<()> {
        self.store.reload()?;
        if let Some(session) = self.store.current_session() {
            info!(session_id = %session.session_id, "Resuming persisted session");
            self.start_refresh();
        }
        Ok(())
    }

    /// Shared post-authentication hook.
    ///
    /// On success the session and principal are stored and background refresh
    /// is (re)started. The result is passed through unchanged unless storing
    /// it fails.
    pub async fn handle_auth_result(&self, result: AuthResult<AuthData>) -> AuthResult<AuthData> {
        let data = result?;
        self.store.save(&data)?;
        self.start_refresh();
        Ok(data)
    }

    /// Re-authenticate the current session in the foreground.
    ///
    /// Fails locally when there is no session. A server verdict that the
    /// session is gone clears local state, unless a new login replaced that
    /// session while the call was in flight.
    pub async fn authenticate(
        &self,
        session_duration_minutes: Option<u32>,
    ) -> AuthResult<AuthData> {
        let (tokens, session_id) =
            self.store.credentials().ok_or_else(AuthError::no_current_session)?;

        match self.authenticator.authenticate(tokens, session_duration_minutes).await {
            Ok(data) => {
                if self.store.refresh_session(&data)? {
                    self.start_refresh();
                }
                Ok(data)
            }
            Err(err) => {
                if self.classifier.is_unrecoverable(&err) {
                    warn!(error = %err, "Session rejected during authenticate; clearing it");
                    self.clear_if_current(session_id.as_deref())?;
                }
                Err(err)
            }
        }
    }

    /// Revoke the session remotely, then locally.
    ///
    /// Local state is cleared when the remote call succeeds or when the server
    /// says the session is already gone, as long as the revoked session is
    /// still the current one. `force_clear` clears whatever is cached.
    pub async fn revoke(&self, force_clear: bool) -> AuthResult<()> {
        let (result, session_id) = match self.store.credentials() {
            Some((tokens, session_id)) => (self.authenticator.revoke(tokens).await, session_id),
            None => (Err(AuthError::no_current_session()), None),
        };

        let session_gone = match &result {
            Ok(()) => true,
            Err(err) => self.classifier.is_unrecoverable(err),
        };
        if force_clear {
            self.clear_local()?;
        } else if session_gone {
            self.clear_if_current(session_id.as_deref())?;
        }
        result
    }

    /// Stop background refresh. Session state is kept.
    pub fn shutdown(&self) {
        self.engine.stop();
    }

    #[must_use]
    pub fn has_valid_session(&self) -> bool {
        self.store.has_valid_session()
    }

    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        self.store.current_session()
    }

    #[must_use]
    pub fn current_principal(&self) -> Option<Principal> {
        self.store.current_principal()
    }

    #[must_use]
    pub fn session_token(&self) -> Option<String> {
        self.store.session_token()
    }

    #[must_use]
    pub fn session_jwt(&self) -> Option<String> {
        self.store.session_jwt()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.store.subscribe()
    }

    /// Start a redirect-based flow: generate, persist and return a new pair.
    pub fn start_pkce(&self) -> AuthResult<PkceCodePair> {
        self.pkce.generate_and_store()
    }

    /// The outstanding PKCE pair, for embedding the challenge in a redirect.
    pub fn pkce_code_pair(&self) -> AuthResult<Option<PkceCodePair>> {
        self.pkce.retrieve()
    }

    #[must_use]
    pub fn pkce(&self) -> &PkceManager {
        &self.pkce
    }

    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    #[must_use]
    pub fn classifier(&self) -> &ErrorClassifier {
        &self.classifier
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn refresh_status(&self) -> RefreshStatus {
        self.engine.status()
    }

    #[must_use]
    pub fn last_refresh_exit(&self) -> Option<RefreshExit> {
        self.engine.last_exit()
    }

    fn start_refresh(&self) {
        self.engine.start(Arc::new(SessionRefresher {
            store: Arc::clone(&self.store),
            authenticator: Arc::clone(&self.authenticator),
        }));
    }

    fn clear_local(&self) -> AuthResult<()> {
        self.engine.stop();
        self.store.revoke()
    }

    fn clear_if_current(&self, session_id: Option<&str>) -> AuthResult<()> {
        let Some(session_id) = session_id else {
            return Ok(());
        };
        if self.store.revoke_if_current(session_id)? {
            self.engine.stop();
        } else {
            debug!(session_id, "Session replaced while the call was in flight; keeping it");
        }
        Ok(())
    }
}
