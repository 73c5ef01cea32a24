//! Testing utilities and helpers
//!
//! - **[`async_utils`]**: polling helpers that cooperate with paused tokio time
//! - **[`mocks`]**: in-memory [`SecureStore`](crate::security::SecureStore)
//!   with fault injection

pub mod async_utils;
pub mod mocks;

pub use async_utils::poll_until;
pub use mocks::MockSecureStore;
