//! Platform keychain provider
//!
//! Thin wrapper over the platform keychain (Keychain Access on macOS,
//! Credential Manager on Windows, Secret Service on Linux) that implements
//! [`SecureStore`].
//!
//! ## Usage
//!
//! ```no_run
//! use authsync_common::security::{KeychainProvider, SecureStore};
//!
//! let keychain = KeychainProvider::new("authsync");
//! keychain.save("session_tokens", "{...}")?;
//! let stored = keychain.load("session_tokens")?;
//! assert!(stored.is_some());
//! # Ok::<(), authsync_common::security::KeychainError>(())
//! ```

use keyring::Entry;
use tracing::debug;

use super::store::{KeychainError, SecureStore};

/// Keychain-backed secret storage scoped to one service name.
pub struct KeychainProvider {
    service_name: String,
}

impl KeychainProvider {
    /// Create a new keychain provider for a specific service
    ///
    /// # Examples
    /// ```
    /// use authsync_common::security::KeychainProvider;
    ///
    /// let keychain = KeychainProvider::new("authsync.consumer");
    /// assert_eq!(keychain.service_name(), "authsync.consumer");
    /// ```
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into() }
    }

    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Store a secret value in the platform keychain
    ///
    /// # Errors
    /// Returns `KeychainError::AccessFailed` if keychain access fails
    pub fn set_secret(&self, key: &str, value: &str) -> Result<(), KeychainError> {
        debug!(service = %self.service_name, key = %key, "Storing secret in keychain");

        let entry = self.create_entry(key)?;
        entry.set_password(value).map_err(|e| {
            KeychainError::AccessFailed(format!("Failed to store secret for {}: {}", key, e))
        })?;

        Ok(())
    }

    /// Retrieve a secret value from the platform keychain
    ///
    /// # Errors
    /// Returns `KeychainError::NotFound` if secret doesn't exist
    /// Returns `KeychainError::AccessFailed` if keychain access fails
    pub fn get_secret(&self, key: &str) -> Result<String, KeychainError> {
        debug!(service = %self.service_name, key = %key, "Retrieving secret from keychain");

        let entry = self.create_entry(key)?;
        entry.get_password().map_err(|e| {
            if matches!(e, keyring::Error::NoEntry) {
                KeychainError::NotFound
            } else {
                KeychainError::AccessFailed(format!("Failed to retrieve secret for {}: {}", key, e))
            }
        })
    }

    /// Delete a secret from the platform keychain (idempotent)
    pub fn delete_secret(&self, key: &str) -> Result<(), KeychainError> {
        debug!(service = %self.service_name, key = %key, "Deleting secret from keychain");

        let entry = self.create_entry(key)?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(KeychainError::AccessFailed(format!(
                "Failed to delete secret for {}: {}",
                key, e
            ))),
        }
    }

    fn create_entry(&self, account: &str) -> Result<Entry, KeychainError> {
        Entry::new(&self.service_name, account).map_err(|e| {
            KeychainError::AccessFailed(format!("Failed to create keychain entry: {}", e))
        })
    }
}

impl SecureStore for KeychainProvider {
    fn save(&self, key: &str, value: &str) -> Result<(), KeychainError> {
        self.set_secret(key, value)
    }

    fn load(&self, key: &str) -> Result<Option<String>, KeychainError> {
        match self.get_secret(key) {
            Ok(value) => Ok(Some(value)),
            Err(KeychainError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn delete(&self, key: &str) -> Result<(), KeychainError> {
        self.delete_secret(key)
    }
}
