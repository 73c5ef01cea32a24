//! Secure key/value storage
//!
//! [`SecureStore`] is the seam every stateful component persists through.
//! The platform keychain implementation lives in [`keychain`]; tests use
//! [`crate::testing::MockSecureStore`].

#[cfg(feature = "platform")]
pub mod keychain;
pub mod store;

#[cfg(feature = "platform")]
pub use keychain::KeychainProvider;
pub use store::{KeychainError, SecureStore};
