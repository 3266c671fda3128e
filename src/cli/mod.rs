//! CLI module
//!
//! Command-line interface for querying console tables.
//!
//! # Commands
//!
//! - `tables` - List available tables
//! - `describe` - Show a table's columns
//! - `check` - Authenticate against the token endpoint
//! - `query` - List a table's rows

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
