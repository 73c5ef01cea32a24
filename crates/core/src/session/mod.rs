//! Session state and lifecycle

pub mod manager;
pub mod ports;
pub mod store;

pub use manager::SessionManager;
pub use ports::SessionAuthenticator;
pub use store::SessionStore;
