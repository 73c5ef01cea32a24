//! The refresh loop and its owning handle

use std::sync::Arc;

use authsync_common::ErrorClassification;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::backoff::{BackoffDecision, RefreshState};
use super::ports::RefreshHandler;
use super::{RefreshConfig, RefreshExit, RefreshStatus};
use crate::classifier::ErrorClassifier;

struct ActiveJob {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

#[derive(Debug)]
struct Published {
    generation: u64,
    status: RefreshStatus,
    last_exit: Option<RefreshExit>,
}

/// Status shared between the engine handle and its loop. Each run carries a
/// generation number so a superseded loop cannot overwrite a newer run's
/// status.
#[derive(Debug)]
struct SharedStatus(Mutex<Published>);

impl SharedStatus {
    fn begin(&self) -> u64 {
        let mut published = self.0.lock();
        published.generation += 1;
        published.status = RefreshStatus::Running;
        published.generation
    }

    fn set(&self, generation: u64, status: RefreshStatus) {
        let mut published = self.0.lock();
        if published.generation == generation {
            published.status = status;
        }
    }

    fn finish(&self, generation: u64, exit: RefreshExit) {
        let mut published = self.0.lock();
        if published.generation == generation && published.status.is_running() {
            published.status = RefreshStatus::Stopped;
            published.last_exit = Some(exit);
        }
    }
}

/// Owns at most one background refresh loop.
///
/// Must be started from within a tokio runtime.
pub struct RefreshEngine {
    config: RefreshConfig,
    classifier: Arc<ErrorClassifier>,
    job: Mutex<Option<ActiveJob>>,
    shared: Arc<SharedStatus>,
}

impl RefreshEngine {
    pub fn new(config: RefreshConfig, classifier: Arc<ErrorClassifier>) -> Self {
        Self {
            config,
            classifier,
            job: Mutex::new(None),
            shared: Arc::new(SharedStatus(Mutex::new(Published {
                generation: 0,
                status: RefreshStatus::Stopped,
                last_exit: None,
            }))),
        }
    }

    #[must_use]
    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    /// Cancel any running loop and launch a new one with fresh backoff state.
    pub fn start(&self, handler: Arc<dyn RefreshHandler>) {
        let mut job = self.job.lock();
        if let Some(previous) = job.take() {
            Self::cancel_job(previous, &self.shared);
        }

        let generation = self.shared.begin();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_loop(
            self.config,
            Arc::clone(&self.classifier),
            handler,
            cancel.clone(),
            Arc::clone(&self.shared),
            generation,
        ));

        info!(
            generation,
            interval_secs = self.config.base_interval.as_secs(),
            "Session refresh started"
        );
        *job = Some(ActiveJob { cancel, handle });
    }

    /// Cancel the running loop, if any. No-op when already stopped.
    pub fn stop(&self) {
        if let Some(job) = self.job.lock().take() {
            Self::cancel_job(job, &self.shared);
            info!("Session refresh stopped");
        }
    }

    #[must_use]
    pub fn status(&self) -> RefreshStatus {
        self.shared.0.lock().status
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status().is_running()
    }

    /// Why the most recent loop ended, if one has.
    #[must_use]
    pub fn last_exit(&self) -> Option<RefreshExit> {
        self.shared.0.lock().last_exit
    }

    fn cancel_job(job: ActiveJob, shared: &SharedStatus) {
        job.cancel.cancel();
        job.handle.abort();
        let generation = shared.0.lock().generation;
        shared.finish(generation, RefreshExit::Stopped);
    }
}

impl Drop for RefreshEngine {
    fn drop(&mut self) {
        if let Some(job) = self.job.get_mut().take() {
            job.cancel.cancel();
            job.handle.abort();
        }
    }
}

async fn run_loop(
    config: RefreshConfig,
    classifier: Arc<ErrorClassifier>,
    handler: Arc<dyn RefreshHandler>,
    cancel: CancellationToken,
    shared: Arc<SharedStatus>,
    generation: u64,
) {
    let mut state = RefreshState::new(&config);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            () = tokio::time::sleep(state.current_delay) => {}
        }

        let Some(session_before) = handler.current_session_id() else {
            debug!(generation, "No session left to refresh; exiting");
            shared.finish(generation, RefreshExit::SessionEnded);
            return;
        };
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            outcome = handler.refresh() => outcome,
        };
        if cancel.is_cancelled() {
            return;
        }

        if handler.current_session_id().as_deref() != Some(session_before.as_str()) {
            debug!(generation, "Session replaced during refresh; discarding result");
            state.retry_now(&config);
            shared.set(generation, RefreshStatus::Running);
            continue;
        }

        let failure = match outcome {
            Ok(data) => {
                let session_id = data.session.session_id.clone();
                match handler.commit(data).await {
                    Ok(()) => {
                        debug!(generation, session_id = %session_id, "Session refreshed");
                        state.reset(&config);
                        shared.set(generation, RefreshStatus::Running);
                        continue;
                    }
                    Err(err) => {
                        warn!(generation, error = %err, "Failed to commit refreshed session");
                        err
                    }
                }
            }
            Err(err) => err,
        };

        if classifier.is_unrecoverable(&failure) {
            warn!(
                generation,
                error_kind = failure.label(),
                error = %failure,
                "Session rejected by server; clearing it"
            );
            if let Err(err) = handler.clear().await {
                error!(generation, error = %err, "Failed to clear rejected session");
            }
            shared.finish(generation, RefreshExit::Unrecoverable);
            return;
        }

        match state.record_failure(&config, Instant::now()) {
            BackoffDecision::Retry { delay, attempt } => {
                debug!(
                    generation,
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error_kind = failure.label(),
                    severity = %failure.severity(),
                    "Session refresh failed; backing off"
                );
                shared.set(generation, RefreshStatus::BackingOff { attempt });
            }
            BackoffDecision::Exhausted => {
                warn!(generation, error = %failure, "Session refresh kept failing; giving up");
                shared.finish(generation, RefreshExit::BackoffExhausted);
                return;
            }
        }
    }
}
