//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Query the Red Hat Hybrid Cloud Console APIs as tables
#[derive(Parser, Debug)]
#[command(name = "crc-connector")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Connection file (YAML)
    #[arg(short, long, global = true)]
    pub connection: Option<PathBuf>,

    /// Console base URL (overrides CRC_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// SSO token endpoint (overrides CRC_TOKEN_URL)
    #[arg(long, global = true)]
    pub token_url: Option<String>,

    /// OAuth2 client ID (overrides CRC_CLIENT_ID)
    #[arg(long, global = true)]
    pub client_id: Option<String>,

    /// OAuth2 client secret (overrides CRC_CLIENT_SECRET)
    #[arg(long, global = true)]
    pub client_secret: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available tables
    Tables,

    /// Show a table's columns
    Describe {
        /// Table name
        table: String,
    },

    /// Authenticate against the token endpoint
    Check,

    /// List a table's rows
    Query {
        /// Table name
        table: String,

        /// Equality qualifier; repeat the key column to query several values
        #[arg(short = 'w', long = "where", value_name = "COLUMN=VALUE", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

fn parse_filter(s: &str) -> std::result::Result<(String, String), String> {
    let (column, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=VALUE, got '{s}'"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("missing column name in '{s}'"));
    }
    Ok((column.to_string(), value.to_string()))
}
