//! Domain types and models

pub mod pkce;
pub mod principal;
pub mod session;

pub use pkce::PkceCodePair;
pub use principal::Principal;
pub use session::{AuthData, Session, SessionTokens};
