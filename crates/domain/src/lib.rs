//! # AuthSync Domain
//!
//! Data types shared by every AuthSync crate.
//!
//! This crate contains:
//! - Session, principal and PKCE data types
//! - The authentication error taxonomy and `AuthResult`
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other AuthSync crates
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
