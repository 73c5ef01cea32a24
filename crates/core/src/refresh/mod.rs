//! Background session refresh
//!
//! One supervised task per [`RefreshEngine`] re-authenticates the current
//! session on a fixed cadence, backs off with jitter on transient failures,
//! discards results for sessions that were replaced mid-flight, and clears
//! the session when the server says it no longer exists. The loop ends on
//! its own once no session is cached.

mod backoff;
mod engine;
mod ports;

use std::time::Duration;

use authsync_domain::constants::{
    DEFAULT_BACKOFF_JITTER_MS, DEFAULT_BACKOFF_UNIT_MS, DEFAULT_MAX_BACKOFF_MS,
    DEFAULT_MAX_BACKOFF_WINDOW_SECS, DEFAULT_REFRESH_INTERVAL_SECS,
};
use authsync_domain::RefreshSettings;

pub use backoff::backoff_delay;
pub use engine::RefreshEngine;
pub use ports::{RefreshHandler, RefreshHooks};

/// Timing parameters for the refresh loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Delay between successful refreshes.
    pub base_interval: Duration,
    /// Multiplied by `2^attempt` to get the backoff delay.
    pub backoff_unit: Duration,
    /// Uniform random offset applied in `[-jitter, +jitter]`.
    pub jitter: Duration,
    /// Ceiling for a single backoff delay.
    pub max_backoff: Duration,
    /// Give up once consecutive failures span longer than this.
    pub max_backoff_window: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            backoff_unit: Duration::from_millis(DEFAULT_BACKOFF_UNIT_MS),
            jitter: Duration::from_millis(DEFAULT_BACKOFF_JITTER_MS),
            max_backoff: Duration::from_millis(DEFAULT_MAX_BACKOFF_MS),
            max_backoff_window: Duration::from_secs(DEFAULT_MAX_BACKOFF_WINDOW_SECS),
        }
    }
}

impl From<&RefreshSettings> for RefreshConfig {
    fn from(settings: &RefreshSettings) -> Self {
        Self {
            base_interval: settings.base_interval(),
            backoff_unit: settings.backoff_unit(),
            jitter: settings.jitter(),
            max_backoff: settings.max_backoff(),
            max_backoff_window: settings.max_backoff_window(),
        }
    }
}

/// Observable state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStatus {
    Stopped,
    Running,
    /// Running, but the last `attempt` refreshes failed.
    BackingOff { attempt: u32 },
}

impl RefreshStatus {
    #[must_use]
    pub fn is_running(self) -> bool {
        !matches!(self, Self::Stopped)
    }
}

/// Why the most recent loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshExit {
    /// `stop()` was called, or the loop was superseded by `start()`.
    Stopped,
    /// The server rejected the session; it was cleared.
    Unrecoverable,
    /// Failures persisted past the backoff window; the session was kept.
    BackoffExhausted,
    /// The session was cleared outside the loop, e.g. expired on read.
    SessionEnded,
}
