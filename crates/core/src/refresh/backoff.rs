use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;

use super::RefreshConfig;

/// Jittered exponential delay for a zero-based retry `attempt`:
/// `min(2^attempt * backoff_unit + uniform(-jitter, +jitter), max_backoff)`.
pub fn backoff_delay(config: &RefreshConfig, attempt: u32) -> Duration {
    let multiplier = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
    let base = config.backoff_unit.saturating_mul(multiplier);

    let jitter_ms = i64::try_from(config.jitter.as_millis()).unwrap_or(i64::MAX);
    let offset =
        if jitter_ms > 0 { rand::thread_rng().gen_range(-jitter_ms..=jitter_ms) } else { 0 };

    let jittered = if offset >= 0 {
        base.saturating_add(Duration::from_millis(offset.unsigned_abs()))
    } else {
        base.saturating_sub(Duration::from_millis(offset.unsigned_abs()))
    };

    jittered.min(config.max_backoff)
}

/// What the loop should do after a recoverable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BackoffDecision {
    Retry { delay: Duration, attempt: u32 },
    Exhausted,
}

/// Per-run loop state. Reset on every successful refresh.
#[derive(Debug)]
pub(crate) struct RefreshState {
    pub(crate) current_delay: Duration,
    attempt: u32,
    backoff_started_at: Option<Instant>,
}

impl RefreshState {
    pub(crate) fn new(config: &RefreshConfig) -> Self {
        Self { current_delay: config.base_interval, attempt: 0, backoff_started_at: None }
    }

    pub(crate) fn reset(&mut self, config: &RefreshConfig) {
        *self = Self::new(config);
    }

    /// Start over for a different session: drop the failure history and run
    /// the next iteration immediately.
    pub(crate) fn retry_now(&mut self, config: &RefreshConfig) {
        self.reset(config);
        self.current_delay = Duration::ZERO;
    }

    pub(crate) fn record_failure(
        &mut self,
        config: &RefreshConfig,
        now: Instant,
    ) -> BackoffDecision {
        let started_at = *self.backoff_started_at.get_or_insert(now);
        if now.saturating_duration_since(started_at) > config.max_backoff_window {
            self.reset(config);
            return BackoffDecision::Exhausted;
        }

        let delay = backoff_delay(config, self.attempt);
        self.attempt = self.attempt.saturating_add(1);
        self.current_delay = delay;
        BackoffDecision::Retry { delay, attempt: self.attempt }
    }
}
