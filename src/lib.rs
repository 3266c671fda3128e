// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # crc-connector
//!
//! Authenticated access to the Red Hat Hybrid Cloud Console APIs, exposed as
//! a set of read-only tables.
//!
//! ## Features
//!
//! - **Client credentials**: OAuth2 tokens fetched and renewed on demand
//! - **Shared clients**: one authenticated transport per connection
//! - **Tables**: gathering rules, Insights aggregator and OCP vulnerability data
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crc_connector::{ClientRegistry, ConnectionConfig, ConnectionOverrides, Quals, Table};
//!
//! #[tokio::main]
//! async fn main() -> crc_connector::Result<()> {
//!     // CRC_URL, CRC_TOKEN_URL, CRC_CLIENT_ID, CRC_CLIENT_SECRET
//!     let config = ConnectionConfig::resolve(&ConnectionOverrides::default());
//!
//!     let registry = ClientRegistry::new();
//!     let table = Table::VulnerabilityCvesV1;
//!     let client = registry.get_client(&config, table.definition().timeout)?;
//!
//!     for row in table.list(&client, &Quals::new()).await? {
//!         println!("{}", serde_json::Value::Object(row));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Table::list(client, quals) → Vec<Row>                   │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//! ┌──────────────────────────────────────────────────────────┐
//! │  ClientRegistry → AuthenticatedClient (per-call timeout) │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//! ┌──────────────────────────────────────────────────────────┐
//! │  SsoTransport: lock → refresh if expired → Bearer header │
//! │        │                                                 │
//! │  Authenticator (client_credentials)   Transport (reqwest)│
//! └──────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Connection configuration
pub mod config;

/// Client-credentials authentication
pub mod auth;

/// Authenticated HTTP transport and client registry
pub mod http;

/// Resource tables
pub mod resources;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{ConnectionConfig, ConnectionOverrides};
pub use error::{Error, Result};
pub use http::{AuthenticatedClient, ClientRegistry};
pub use resources::{ColumnDef, Table, TableDef};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
