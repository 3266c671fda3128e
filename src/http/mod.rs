//! HTTP module
//!
//! Authenticated access to the console APIs.
//!
//! # Features
//!
//! - **Bearer tokens**: every request carries a client-credentials token
//! - **Lazy refresh**: tokens are renewed on the request path, only once expired
//! - **Client cache**: one transport per connection, shared by all handles

mod client;
mod registry;
mod transport;

pub use client::AuthenticatedClient;
pub use registry::ClientRegistry;
pub use transport::{SsoTransport, Transport};
