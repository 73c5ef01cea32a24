//! Scripted implementations of the refresh and session ports

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use authsync_core::{RefreshHandler, SessionAuthenticator};
use authsync_domain::{AuthData, AuthError, AuthResult, SessionTokens};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::Instant;

use super::fixtures;

/// Refresh handler driven by a queue of outcomes.
///
/// When the queue is empty, `refresh` succeeds with a payload for the
/// current session id.
#[derive(Default)]
pub struct ScriptedHandler {
    outcomes: Mutex<VecDeque<AuthResult<AuthData>>>,
    session_id: Mutex<Option<String>>,
    replace_on_next_refresh: Mutex<Option<String>>,
    refresh_latency: Mutex<Duration>,
    refresh_times: Mutex<Vec<Instant>>,
    committed: Mutex<Vec<String>>,
    clears: AtomicUsize,
}

impl ScriptedHandler {
    pub fn with_session(session_id: &str) -> Self {
        let handler = Self::default();
        *handler.session_id.lock() = Some(session_id.to_string());
        handler
    }

    pub fn push(&self, outcome: AuthResult<AuthData>) -> &Self {
        self.outcomes.lock().push_back(outcome);
        self
    }

    pub fn push_failures(&self, count: usize, make: impl Fn() -> AuthError) -> &Self {
        let mut outcomes = self.outcomes.lock();
        for _ in 0..count {
            outcomes.push_back(Err(make()));
        }
        drop(outcomes);
        self
    }

    /// The next `refresh` swaps the cached session for `session_id` while in
    /// flight, as a concurrent login would.
    pub fn replace_session_during_next_refresh(&self, session_id: &str) {
        *self.replace_on_next_refresh.lock() = Some(session_id.to_string());
    }

    /// Drop the cached session outside the loop, as an expiry on read does.
    pub fn end_session(&self) {
        *self.session_id.lock() = None;
    }

    pub fn set_refresh_latency(&self, latency: Duration) {
        *self.refresh_latency.lock() = latency;
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_times.lock().len()
    }

    pub fn refresh_times(&self) -> Vec<Instant> {
        self.refresh_times.lock().clone()
    }

    /// Gaps between consecutive refresh attempts.
    pub fn refresh_gaps(&self) -> Vec<Duration> {
        self.refresh_times.lock().windows(2).map(|pair| pair[1] - pair[0]).collect()
    }

    pub fn committed(&self) -> Vec<String> {
        self.committed.lock().clone()
    }

    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    pub fn session_id(&self) -> Option<String> {
        self.session_id.lock().clone()
    }
}

#[async_trait]
impl RefreshHandler for ScriptedHandler {
    async fn refresh(&self) -> AuthResult<AuthData> {
        self.refresh_times.lock().push(Instant::now());

        let latency = *self.refresh_latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if let Some(replacement) = self.replace_on_next_refresh.lock().take() {
            *self.session_id.lock() = Some(replacement);
        }

        let scripted = self.outcomes.lock().pop_front();
        scripted.unwrap_or_else(|| {
            let session_id = self.session_id().ok_or_else(AuthError::no_current_session)?;
            Ok(fixtures::auth_data(&session_id))
        })
    }

    async fn commit(&self, data: AuthData) -> AuthResult<()> {
        self.committed.lock().push(data.session.session_id);
        Ok(())
    }

    async fn clear(&self) -> AuthResult<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        *self.session_id.lock() = None;
        Ok(())
    }

    fn current_session_id(&self) -> Option<String> {
        self.session_id()
    }
}

/// Remote authenticator with scripted responses.
///
/// Unscripted `authenticate` calls echo the caller's session back with the
/// same tokens; unscripted `revoke` calls succeed.
#[derive(Default)]
pub struct FakeAuthenticator {
    authenticate_outcomes: Mutex<VecDeque<AuthResult<AuthData>>>,
    revoke_outcomes: Mutex<VecDeque<AuthResult<()>>>,
    authenticate_calls: Mutex<Vec<(SessionTokens, Option<u32>)>>,
    revoke_calls: AtomicUsize,
    hold: Mutex<Option<Arc<Notify>>>,
}

impl FakeAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_authenticate(&self, outcome: AuthResult<AuthData>) {
        self.authenticate_outcomes.lock().push_back(outcome);
    }

    pub fn push_revoke(&self, outcome: AuthResult<()>) {
        self.revoke_outcomes.lock().push_back(outcome);
    }

    /// Park the next `authenticate` or `revoke` call until the returned
    /// handle is notified.
    pub fn hold_next_call(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.hold.lock() = Some(Arc::clone(&gate));
        gate
    }

    async fn wait_if_held(&self) {
        let gate = self.hold.lock().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    pub fn authenticate_count(&self) -> usize {
        self.authenticate_calls.lock().len()
    }

    pub fn last_duration(&self) -> Option<Option<u32>> {
        self.authenticate_calls.lock().last().map(|(_, minutes)| *minutes)
    }

    pub fn revoke_count(&self) -> usize {
        self.revoke_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionAuthenticator for FakeAuthenticator {
    async fn authenticate(
        &self,
        tokens: SessionTokens,
        session_duration_minutes: Option<u32>,
    ) -> AuthResult<AuthData> {
        self.authenticate_calls.lock().push((tokens.clone(), session_duration_minutes));
        self.wait_if_held().await;

        let scripted = self.authenticate_outcomes.lock().pop_front();
        scripted.unwrap_or_else(|| {
            let session_id = tokens
                .session_token
                .strip_prefix("token-")
                .unwrap_or(&tokens.session_token)
                .to_string();
            Ok(fixtures::auth_data_with_token(&session_id, &tokens.session_token))
        })
    }

    async fn revoke(&self, _tokens: SessionTokens) -> AuthResult<()> {
        self.revoke_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_if_held().await;
        self.revoke_outcomes.lock().pop_front().unwrap_or(Ok(()))
    }
}
