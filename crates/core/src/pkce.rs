//! PKCE secret manager
//!
//! Holds the single outstanding code pair for a redirect-based
//! authentication attempt. Both halves are written and read under one lock,
//! and a pair is only ever handed out when both halves are present and the
//! challenge derives from the verifier.

use std::future::Future;
use std::sync::Arc;

use authsync_common::auth::pkce::{challenge_matches, PKCEChallenge};
use authsync_common::security::SecureStore;
use authsync_domain::constants::{PKCE_CODE_CHALLENGE_KEY, PKCE_CODE_VERIFIER_KEY};
use authsync_domain::{AuthError, AuthResult, PkceCodePair};
use parking_lot::Mutex;
use tracing::{debug, warn};

pub struct PkceManager {
    store: Arc<dyn SecureStore>,
    lock: Mutex<()>,
}

impl PkceManager {
    pub fn new(store: Arc<dyn SecureStore>) -> Self {
        Self { store, lock: Mutex::new(()) }
    }

    /// Generate a fresh pair, persist it and return it. Any previous pair is
    /// superseded.
    pub fn generate_and_store(&self) -> AuthResult<PkceCodePair> {
        let _guard = self.lock.lock();
        let challenge = PKCEChallenge::generate();

        let written = self
            .store
            .save(PKCE_CODE_VERIFIER_KEY, &challenge.code_verifier)
            .and_then(|()| self.store.save(PKCE_CODE_CHALLENGE_KEY, &challenge.code_challenge));

        if let Err(err) = written {
            warn!(error = %err, "Failed to persist PKCE pair; discarding both halves");
            self.delete_both();
            return Err(err.into());
        }

        debug!("Generated new PKCE code pair");
        Ok(PkceCodePair {
            code_challenge: challenge.code_challenge,
            code_verifier: challenge.code_verifier,
        })
    }

    /// The stored pair, or `None` if either half is missing or the halves do
    /// not belong together.
    pub fn retrieve(&self) -> AuthResult<Option<PkceCodePair>> {
        let _guard = self.lock.lock();

        let verifier = self.store.load(PKCE_CODE_VERIFIER_KEY)?;
        let challenge = self.store.load(PKCE_CODE_CHALLENGE_KEY)?;

        match (verifier, challenge) {
            (Some(code_verifier), Some(code_challenge)) => {
                if challenge_matches(&code_verifier, &code_challenge) {
                    Ok(Some(PkceCodePair { code_challenge, code_verifier }))
                } else {
                    warn!("Stored PKCE challenge does not match its verifier");
                    Ok(None)
                }
            }
            (None, None) => Ok(None),
            _ => {
                debug!("Ignoring partially stored PKCE pair");
                Ok(None)
            }
        }
    }

    /// The stored pair, or [`AuthError::CredentialMissing`].
    pub fn require(&self) -> AuthResult<PkceCodePair> {
        self.retrieve()?.ok_or(AuthError::CredentialMissing)
    }

    /// Delete both halves.
    pub fn clear(&self) -> AuthResult<()> {
        let _guard = self.lock.lock();
        let verifier = self.store.delete(PKCE_CODE_VERIFIER_KEY);
        let challenge = self.store.delete(PKCE_CODE_CHALLENGE_KEY);
        verifier?;
        challenge?;
        Ok(())
    }

    /// Run a code exchange with the stored pair.
    ///
    /// Fails with [`AuthError::CredentialMissing`] before calling `exchange`
    /// when no pair is stored. Once `exchange` finishes the pair is cleared,
    /// whatever the outcome.
    pub async fn exchange<F, Fut, T>(&self, exchange: F) -> AuthResult<T>
    where
        F: FnOnce(PkceCodePair) -> Fut,
        Fut: Future<Output = AuthResult<T>>,
    {
        let pair = self.require()?;
        let outcome = exchange(pair).await;

        if let Err(err) = self.clear() {
            warn!(error = %err, "Failed to clear PKCE pair after exchange");
        }
        outcome
    }

    fn delete_both(&self) {
        for key in [PKCE_CODE_VERIFIER_KEY, PKCE_CODE_CHALLENGE_KEY] {
            if let Err(err) = self.store.delete(key) {
                warn!(key, error = %err, "Failed to delete PKCE entry");
            }
        }
    }
}
