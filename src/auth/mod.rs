//! Authentication module
//!
//! Client-credentials token exchange against the SSO token endpoint.
//!
//! The `Authenticator` only fetches tokens; keeping the resulting
//! `TokenState` fresh is the job of the transport in [`crate::http`].

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{ClientCredentials, TokenResponse, TokenState};
