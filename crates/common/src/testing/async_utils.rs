//! Async testing utilities
//!
//! Timing is measured with `tokio::time`, so these helpers work inside
//! `#[tokio::test(start_paused = true)]` where the clock auto-advances.

#![allow(clippy::missing_panics_doc)]

use std::future::Future;
use std::time::Duration;

/// Assert that an async condition becomes true within a timeout
///
/// # Examples
///
/// ```no_run
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// #[tokio::test(start_paused = true)]
/// async fn test_eventually() {
///     let flag = Arc::new(AtomicBool::new(false));
///     let flag_clone = flag.clone();
///
///     tokio::spawn(async move {
///         tokio::time::sleep(Duration::from_secs(60)).await;
///         flag_clone.store(true, Ordering::SeqCst);
///     });
///
///     authsync_common::assert_eventually_async!(Duration::from_secs(120), async {
///         flag.load(Ordering::SeqCst)
///     });
/// }
/// ```
#[macro_export]
macro_rules! assert_eventually_async {
    ($timeout:expr, $fut:expr) => {{
        let timeout_duration = $timeout;
        let result = tokio::time::timeout(timeout_duration, async {
            loop {
                if $fut.await {
                    break;
                }
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            }
        })
        .await;

        assert!(result.is_ok(), "Condition did not become true within {:?}", timeout_duration);
    }};
}

/// Poll `condition` every `interval` until it returns true or `timeout`
/// elapses. Returns whether the condition was met.
pub async fn poll_until<F, Fut>(timeout: Duration, interval: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = tokio::time::Instant::now();

    while start.elapsed() < timeout {
        if condition().await {
            return true;
        }
        tokio::time::sleep(interval).await;
    }

    condition().await
}

#[cfg(test)]
mod tests {
    //! Unit tests for testing::async_utils.
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    /// Validates `poll_until` under paused time.
    ///
    /// Assertions:
    /// - Ensures the flag set after a long virtual sleep is observed.
    #[tokio::test(start_paused = true)]
    async fn test_poll_until_with_paused_time() {
        let flag = Arc::new(AtomicBool::new(false));
        let flag_clone = flag.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(90)).await;
            flag_clone.store(true, Ordering::SeqCst);
        });

        let met = poll_until(Duration::from_secs(120), Duration::from_secs(1), || async {
            flag.load(Ordering::SeqCst)
        })
        .await;

        assert!(met);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_times_out() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();

        let met = poll_until(Duration::from_secs(1), Duration::from_millis(100), || {
            let calls = calls_clone.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                false
            }
        })
        .await;

        assert!(!met);
        assert!(calls.load(Ordering::SeqCst) >= 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_assert_eventually_async_macro() {
        let flag = Arc::new(AtomicBool::new(false));
        let flag_clone = flag.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            flag_clone.store(true, Ordering::SeqCst);
        });

        crate::assert_eventually_async!(Duration::from_secs(10), async {
            flag.load(Ordering::SeqCst)
        });
    }
}
