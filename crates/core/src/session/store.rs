//! Session store
//!
//! Single source of truth for the cached session, its credentials and the
//! principal. Writes are serialized through one writer lock and persisted to
//! the [`SecureStore`] before the in-memory state is swapped, so readers only
//! ever observe a fully applied state. No lock is held across an `.await`;
//! every method here is synchronous.

use std::sync::Arc;

use authsync_common::security::SecureStore;
use authsync_domain::constants::{
    LAST_VALIDATED_AT_KEY, PRINCIPAL_DATA_KEY, SESSION_DATA_KEY, SESSION_TOKENS_KEY,
};
use authsync_domain::{AuthData, AuthError, AuthResult, Principal, Session, SessionTokens};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// A pending secure-store write: `Some` saves, `None` deletes.
type StoreWrite = (&'static str, Option<String>);

#[derive(Debug, Clone, Default)]
struct SessionState {
    tokens: Option<SessionTokens>,
    session: Option<Session>,
    principal: Option<Principal>,
    last_validated_at: Option<DateTime<Utc>>,
}

/// In-memory and persisted session state.
pub struct SessionStore {
    secure_store: Arc<dyn SecureStore>,
    state: RwLock<SessionState>,
    writer: Mutex<()>,
    changes: watch::Sender<Option<Session>>,
}

impl SessionStore {
    /// Create an empty store. Call [`SessionStore::reload`] to hydrate it from
    /// the secure store.
    pub fn new(secure_store: Arc<dyn SecureStore>) -> Self {
        let (changes, _) = watch::channel(None);
        Self {
            secure_store,
            state: RwLock::new(SessionState::default()),
            writer: Mutex::new(()),
            changes,
        }
    }

    /// Create a store and hydrate it from whatever was persisted.
    pub fn load(secure_store: Arc<dyn SecureStore>) -> AuthResult<Self> {
        let store = Self::new(secure_store);
        store.reload()?;
        Ok(store)
    }

    /// Replace in-memory state with the persisted state.
    ///
    /// A token record that is missing, unparsable or only half filled counts
    /// as "no session".
    pub fn reload(&self) -> AuthResult<()> {
        let _writer = self.writer.lock();

        let tokens = self
            .read_persisted::<SessionTokens>(SESSION_TOKENS_KEY)?
            .filter(SessionTokens::is_complete);
        let (session, principal) = if tokens.is_some() {
            (
                self.read_persisted::<Session>(SESSION_DATA_KEY)?,
                self.read_persisted::<Principal>(PRINCIPAL_DATA_KEY)?,
            )
        } else {
            (None, None)
        };
        let last_validated_at = self
            .secure_store
            .load(LAST_VALIDATED_AT_KEY)?
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|dt| dt.with_timezone(&Utc));

        debug!(
            has_session = tokens.is_some(),
            session_id = session.as_ref().map(|s| s.session_id.as_str()),
            "Session store hydrated"
        );

        *self.state.write() =
            SessionState { tokens, session: session.clone(), principal, last_validated_at };
        self.changes.send_replace(session);
        Ok(())
    }

    /// Persist new credentials and session metadata as one unit.
    ///
    /// The cached principal is kept if it belongs to the same principal.
    pub fn update_session(&self, tokens: SessionTokens, session: Session) -> AuthResult<()> {
        let data = AuthData {
            session_token: tokens.session_token,
            session_jwt: tokens.session_jwt,
            session,
            principal: None,
        };
        self.save(&data)
    }

    /// Persist a full authentication payload (credentials, session and
    /// principal when present).
    pub fn save(&self, data: &AuthData) -> AuthResult<()> {
        let _writer = self.writer.lock();
        self.apply_locked(data)
    }

    /// Commit a refreshed session only if it is still the current one.
    ///
    /// Returns `Ok(false)` without writing anything when the cached session id
    /// no longer matches.
    pub fn refresh_session(&self, data: &AuthData) -> AuthResult<bool> {
        let _writer = self.writer.lock();

        let current = self.state.read().session.as_ref().map(|s| s.session_id.clone());
        if current.as_deref() != Some(data.session_id()) {
            debug!(
                refreshed_session_id = %data.session_id(),
                current_session_id = current.as_deref(),
                "Discarding refresh for a session that is no longer current"
            );
            return Ok(false);
        }

        self.apply_locked(data)?;
        Ok(true)
    }

    /// Replace the cached principal.
    pub fn update_principal(&self, principal: Principal) -> AuthResult<()> {
        let _writer = self.writer.lock();
        self.write_all(vec![(PRINCIPAL_DATA_KEY, Some(encode(&principal)?))])?;
        self.state.write().principal = Some(principal);
        Ok(())
    }

    /// Clear persisted credentials and all in-memory state. Idempotent.
    pub fn revoke(&self) -> AuthResult<()> {
        let _writer = self.writer.lock();
        self.revoke_locked()
    }

    /// Revoke only while `session_id` is still the cached session.
    ///
    /// Returns `Ok(false)` without touching anything when another session
    /// has replaced it.
    pub fn revoke_if_current(&self, session_id: &str) -> AuthResult<bool> {
        let _writer = self.writer.lock();

        let current = self.current_session_id();
        if current.as_deref() != Some(session_id) {
            debug!(
                session_id,
                current_session_id = current.as_deref(),
                "Not revoking a session that is no longer current"
            );
            return Ok(false);
        }

        self.revoke_locked()?;
        Ok(true)
    }

    fn revoke_locked(&self) -> AuthResult<()> {
        let had_session = {
            let state = self.state.read();
            state.tokens.is_some() || state.session.is_some()
        };

        self.write_all(vec![
            (SESSION_TOKENS_KEY, None),
            (SESSION_DATA_KEY, None),
            (PRINCIPAL_DATA_KEY, None),
            (LAST_VALIDATED_AT_KEY, None),
        ])?;

        *self.state.write() = SessionState::default();

        if had_session {
            info!("Session revoked");
            self.changes.send_replace(None);
        }
        Ok(())
    }

    /// `true` iff both the session token and the session JWT are cached.
    #[must_use]
    pub fn has_valid_session(&self) -> bool {
        self.state.read().tokens.is_some()
    }

    /// Fail locally with the "no current session" usage error when there is
    /// nothing to act on.
    pub fn require_session(&self) -> AuthResult<()> {
        if self.has_valid_session() {
            Ok(())
        } else {
            Err(AuthError::no_current_session())
        }
    }

    #[must_use]
    pub fn current_session_id(&self) -> Option<String> {
        self.state.read().session.as_ref().map(|s| s.session_id.clone())
    }

    /// The cached session, revoking it first if it has already expired.
    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        self.current_session_at(Utc::now())
    }

    /// [`SessionStore::current_session`] against an explicit clock reading.
    #[must_use]
    pub fn current_session_at(&self, now: DateTime<Utc>) -> Option<Session> {
        let session = self.state.read().session.clone()?;
        if !session.is_expired_at(now) {
            return Some(session);
        }

        // A login may have committed since the unlocked read.
        let _writer = self.writer.lock();
        let session = self.state.read().session.clone()?;
        if !session.is_expired_at(now) {
            return Some(session);
        }

        info!(session_id = %session.session_id, "Cached session expired; clearing it");
        if let Err(err) = self.revoke_locked() {
            warn!(error = %err, "Failed to clear expired session");
        }
        None
    }

    #[must_use]
    pub fn current_principal(&self) -> Option<Principal> {
        self.state.read().principal.clone()
    }

    #[must_use]
    pub fn tokens(&self) -> Option<SessionTokens> {
        self.state.read().tokens.clone()
    }

    /// Credentials together with the id of the session they belong to, read
    /// as one snapshot.
    #[must_use]
    pub fn credentials(&self) -> Option<(SessionTokens, Option<String>)> {
        let state = self.state.read();
        let tokens = state.tokens.clone()?;
        Some((tokens, state.session.as_ref().map(|s| s.session_id.clone())))
    }

    #[must_use]
    pub fn session_token(&self) -> Option<String> {
        self.state.read().tokens.as_ref().map(|t| t.session_token.clone())
    }

    #[must_use]
    pub fn session_jwt(&self) -> Option<String> {
        self.state.read().tokens.as_ref().map(|t| t.session_jwt.clone())
    }

    /// When the session was last written by a successful authentication or
    /// refresh.
    #[must_use]
    pub fn last_validated_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().last_validated_at
    }

    /// Observe every session change, including `None` on revoke.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.changes.subscribe()
    }

    fn apply_locked(&self, data: &AuthData) -> AuthResult<()> {
        let tokens = data.tokens();
        if !tokens.is_complete() {
            return Err(AuthError::usage("Both a session token and a session JWT are required"));
        }
        if !data.session.has_valid_lifetime() {
            return Err(AuthError::usage("Session expires_at must be after started_at"));
        }

        let principal = match &data.principal {
            Some(principal) => Some(principal.clone()),
            None => self
                .state
                .read()
                .principal
                .clone()
                .filter(|p| p.principal_id == data.session.principal_id),
        };
        let now = Utc::now();

        self.write_all(vec![
            (SESSION_TOKENS_KEY, Some(encode(&tokens)?)),
            (SESSION_DATA_KEY, Some(encode(&data.session)?)),
            (PRINCIPAL_DATA_KEY, principal.as_ref().map(encode).transpose()?),
            (LAST_VALIDATED_AT_KEY, Some(now.to_rfc3339())),
        ])?;

        *self.state.write() = SessionState {
            tokens: Some(tokens),
            session: Some(data.session.clone()),
            principal,
            last_validated_at: Some(now),
        };

        debug!(session_id = %data.session.session_id, "Session updated");
        self.changes.send_replace(Some(data.session.clone()));
        Ok(())
    }

    /// Apply every write or none of them: on failure, entries already written
    /// are restored to their previous values.
    fn write_all(&self, writes: Vec<StoreWrite>) -> AuthResult<()> {
        let mut applied: Vec<StoreWrite> = Vec::with_capacity(writes.len());

        for (key, value) in writes {
            let outcome = self.secure_store.load(key).and_then(|previous| {
                match &value {
                    Some(v) => self.secure_store.save(key, v)?,
                    None => self.secure_store.delete(key)?,
                }
                Ok(previous)
            });

            match outcome {
                Ok(previous) => applied.push((key, previous)),
                Err(err) => {
                    warn!(key, error = %err, "Secure store write failed; rolling back");
                    self.roll_back(applied);
                    return Err(err.into());
                }
            }
        }
        Ok(())
    }

    fn roll_back(&self, applied: Vec<StoreWrite>) {
        for (key, previous) in applied.into_iter().rev() {
            let restored = match previous {
                Some(value) => self.secure_store.save(key, &value),
                None => self.secure_store.delete(key),
            };
            if let Err(err) = restored {
                warn!(key, error = %err, "Failed to restore secure store entry");
            }
        }
    }

    fn read_persisted<T: DeserializeOwned>(&self, key: &str) -> AuthResult<Option<T>> {
        let Some(raw) = self.secure_store.load(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(key, error = %err, "Ignoring unreadable persisted session entry");
                Ok(None)
            }
        }
    }
}

fn encode<T: Serialize>(value: &T) -> AuthResult<String> {
    serde_json::to_string(value)
        .map_err(|err| AuthError::storage(format!("Failed to encode session entry: {err}")))
}
