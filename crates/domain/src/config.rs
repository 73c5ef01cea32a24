//! Configuration structures
//!
//! Plain data with defaults. Loading (files, `.env`, environment overrides)
//! lives in `authsync_core::config`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BACKOFF_JITTER_MS, DEFAULT_BACKOFF_UNIT_MS, DEFAULT_MAX_BACKOFF_MS,
    DEFAULT_MAX_BACKOFF_WINDOW_SECS, DEFAULT_REFRESH_INTERVAL_SECS, DEFAULT_SERVICE_NAME,
    DEFAULT_UNRECOVERABLE_ERROR_TYPES,
};
use crate::errors::ConfigError;

/// Top-level configuration for a session manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub storage: StorageConfig,
    pub refresh: RefreshSettings,
    /// Server error codes that destroy the local session instead of being
    /// retried.
    pub unrecoverable_error_types: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            refresh: RefreshSettings::default(),
            unrecoverable_error_types: DEFAULT_UNRECOVERABLE_ERROR_TYPES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

impl SessionConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.storage.validate()?;
        self.refresh.validate()
    }
}

/// Secure storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Keychain service name that namespaces every stored key.
    pub service_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { service_name: DEFAULT_SERVICE_NAME.to_string() }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "storage.service_name".into(),
                message: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

/// Background refresh cadence, in serializable units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshSettings {
    pub base_interval_secs: u64,
    pub backoff_unit_ms: u64,
    pub jitter_ms: u64,
    pub max_backoff_ms: u64,
    pub max_backoff_window_secs: u64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            base_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            backoff_unit_ms: DEFAULT_BACKOFF_UNIT_MS,
            jitter_ms: DEFAULT_BACKOFF_JITTER_MS,
            max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
            max_backoff_window_secs: DEFAULT_MAX_BACKOFF_WINDOW_SECS,
        }
    }
}

impl RefreshSettings {
    #[must_use]
    pub fn base_interval(&self) -> Duration {
        Duration::from_secs(self.base_interval_secs)
    }

    #[must_use]
    pub fn backoff_unit(&self) -> Duration {
        Duration::from_millis(self.backoff_unit_ms)
    }

    #[must_use]
    pub fn jitter(&self) -> Duration {
        Duration::from_millis(self.jitter_ms)
    }

    #[must_use]
    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    #[must_use]
    pub fn max_backoff_window(&self) -> Duration {
        Duration::from_secs(self.max_backoff_window_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: format!("refresh.{key}"),
            message: message.to_string(),
        };

        if self.base_interval_secs == 0 {
            return Err(invalid("base_interval_secs", "must be greater than zero"));
        }
        if self.backoff_unit_ms == 0 {
            return Err(invalid("backoff_unit_ms", "must be greater than zero"));
        }
        if self.max_backoff_ms < self.backoff_unit_ms {
            return Err(invalid("max_backoff_ms", "must be at least backoff_unit_ms"));
        }
        // Consecutive delays must keep growing even with opposite-sign jitter.
        if self.jitter_ms.saturating_mul(2) >= self.backoff_unit_ms {
            return Err(invalid("jitter_ms", "must be less than half of backoff_unit_ms"));
        }
        Ok(())
    }
}
