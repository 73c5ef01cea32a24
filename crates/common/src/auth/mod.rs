//! Authentication primitives
//!
//! Stateless building blocks; the stateful PKCE manager lives in
//! `authsync-core`.

pub mod pkce;

pub use pkce::{challenge_matches, generate_code_challenge, generate_code_verifier, PKCEChallenge};
