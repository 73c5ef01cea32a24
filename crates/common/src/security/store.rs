//! Storage abstraction for encrypted-at-rest string secrets

use std::sync::Arc;

use authsync_domain::AuthError;
use thiserror::Error;

/// Durable, encrypted-at-rest string storage keyed by name.
///
/// Implementations must isolate keys per service and survive process
/// restarts. Calls are synchronous and short; callers never hold them across
/// an `.await`.
pub trait SecureStore: Send + Sync {
    /// Persist `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &str) -> Result<(), KeychainError>;

    /// Read the value under `key`, or `None` if nothing is stored.
    fn load(&self, key: &str) -> Result<Option<String>, KeychainError>;

    /// Remove `key`. Deleting a missing key succeeds.
    fn delete(&self, key: &str) -> Result<(), KeychainError>;

    /// Convenience wrapper over [`SecureStore::load`].
    fn contains(&self, key: &str) -> Result<bool, KeychainError> {
        Ok(self.load(key)?.is_some())
    }
}

impl<T: SecureStore + ?Sized> SecureStore for Arc<T> {
    fn save(&self, key: &str, value: &str) -> Result<(), KeychainError> {
        (**self).save(key, value)
    }

    fn load(&self, key: &str) -> Result<Option<String>, KeychainError> {
        (**self).load(key)
    }

    fn delete(&self, key: &str) -> Result<(), KeychainError> {
        (**self).delete(key)
    }
}

/// Keychain error types
#[derive(Debug, Error)]
pub enum KeychainError {
    /// Keychain access failed (permission denied, not available, etc.)
    #[error("Keychain access failed: {0}")]
    AccessFailed(String),

    /// Entry not found in keychain
    #[error("Entry not found")]
    NotFound,

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Underlying keyring library error
    #[cfg(feature = "platform")]
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

impl From<KeychainError> for AuthError {
    fn from(err: KeychainError) -> Self {
        AuthError::storage(err.to_string())
    }
}
