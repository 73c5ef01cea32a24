//! Mock implementations for testing
//!
//! [`MockSecureStore`] keeps secrets in memory and can be told to fail
//! writes, either globally or for a single key, so callers can exercise their
//! rollback paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::security::{KeychainError, SecureStore};

type StorageData = Arc<Mutex<HashMap<String, String>>>;

/// In-memory secure store. Clones share the same backing map.
#[derive(Clone, Debug, Default)]
pub struct MockSecureStore {
    storage: StorageData,
    fail_writes: Arc<Mutex<bool>>,
    fail_key: Arc<Mutex<Option<String>>>,
    writes: Arc<AtomicUsize>,
}

impl MockSecureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save`/`delete` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock() = fail;
    }

    /// Make writes to one specific key fail.
    pub fn fail_writes_for(&self, key: Option<&str>) {
        *self.fail_key.lock() = key.map(ToOwned::to_owned);
    }

    /// Raw read that bypasses fault injection.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.storage.lock().get(key).cloned()
    }

    /// Raw write that bypasses fault injection.
    pub fn insert(&self, key: &str, value: &str) {
        self.storage.lock().insert(key.to_string(), value.to_string());
    }

    #[must_use]
    pub fn has_key(&self, key: &str) -> bool {
        self.storage.lock().contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage.lock().is_empty()
    }

    /// Number of successful `save`/`delete` calls.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_write(&self, key: &str) -> Result<(), KeychainError> {
        let key_fails = self.fail_key.lock().as_deref() == Some(key);
        if *self.fail_writes.lock() || key_fails {
            return Err(KeychainError::AccessFailed(format!("injected write failure for {key}")));
        }
        Ok(())
    }
}

impl SecureStore for MockSecureStore {
    fn save(&self, key: &str, value: &str) -> Result<(), KeychainError> {
        self.check_write(key)?;
        self.storage.lock().insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>, KeychainError> {
        Ok(self.storage.lock().get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<(), KeychainError> {
        self.check_write(key)?;
        self.storage.lock().remove(key);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
