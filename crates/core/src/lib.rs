//! # AuthSync Core
//!
//! Client-side session lifecycle for a remote authentication service.
//!
//! This crate contains:
//! - Persistent session state backed by a [`SecureStore`](authsync_common::SecureStore)
//! - The background refresh engine with jittered exponential backoff
//! - PKCE code pair management for redirect-based flows
//! - Classification of transport and server failures into `AuthError`
//! - Configuration loading from files, `.env` and environment variables
//!
//! ## Architecture Principles
//! - Network calls stay behind [`SessionAuthenticator`]
//! - Storage stays behind `SecureStore`
//! - Every async operation returns `AuthResult`

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod callback;
pub mod classifier;
pub mod config;
pub mod pkce;
pub mod refresh;
pub mod session;

pub use callback::spawn_with_callback;
pub use classifier::{ErrorClassifier, TransportFailure};
pub use pkce::PkceManager;
pub use refresh::{
    RefreshConfig, RefreshEngine, RefreshExit, RefreshHandler, RefreshHooks, RefreshStatus,
};
pub use session::{SessionAuthenticator, SessionManager, SessionStore};
