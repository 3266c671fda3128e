//! Common types used throughout the connector
//!
//! Shared type aliases and the column type vocabulary used by table
//! definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A single emitted table row, keyed by column name
pub type Row = JsonObject;

/// Equality qualifiers extracted from a query predicate (`column = value`)
pub type Quals = HashMap<String, String>;

// ============================================================================
// Timeouts
// ============================================================================

/// Timeout applied to API calls unless a table asks for more
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Timeout for endpoints known to respond slowly
pub const SLOW_ENDPOINT_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// Column Types
// ============================================================================

/// Column data type, as exposed to the query layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// UTF-8 string
    String,
    /// 64-bit integer
    Int,
    /// Double precision float
    Double,
    /// Boolean
    Bool,
    /// RFC 3339 timestamp
    Timestamp,
    /// Arbitrary JSON
    Json,
}

impl ColumnType {
    /// Get the type name
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Int => "int",
            ColumnType::Double => "double",
            ColumnType::Bool => "bool",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Json => "json",
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
