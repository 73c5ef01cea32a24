//! Shared test helpers for `authsync-core` integration tests.
//!
//! Fixtures build realistic session payloads; the mocks script the remote
//! side so refresh and manager tests can focus on behaviour.

#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
