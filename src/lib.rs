//! Client-side session and profile synchronization for the userauth identity service.
//!
//! A [`state::ClientState`] wires the pieces together: the credential store
//! persists `{token, profile}`, the session manager owns it, and the profile
//! synchronizer reconciles the cached profile with the service through an
//! [`gateway::AuthGateway`].

pub mod config;
pub mod error;
pub mod state;

pub mod models {
    pub mod api;
    pub mod profile;
    pub mod session;
}

pub mod store;

pub mod gateway;

pub mod services {
    pub mod auth;
    pub mod profile;
    pub mod session;
}

pub mod validation {
    pub mod auth;
}

pub use config::{Config, GuestPolicy};
pub use error::{AppError, ErrorKind, Result};
pub use state::ClientState;
