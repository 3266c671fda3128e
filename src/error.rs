//! Error types for the CRC connector
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for the CRC connector
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("'{field}' must be set in the connection configuration")]
    MissingConfigField { field: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("authenticate - error making request: {source}")]
    TokenRequest {
        #[source]
        source: reqwest::Error,
    },

    #[error("authenticate - token endpoint returned {status}: {body}")]
    TokenStatus { status: u16, body: String },

    #[error("authenticate - error parsing token response: {message}")]
    TokenDecode { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed with status code {status} and body: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: std::time::Duration },

    #[error("Failed to decode response from '{endpoint}': {message}")]
    Decode { endpoint: String, message: String },

    // ============================================================================
    // Table Errors
    // ============================================================================
    #[error("Table '{table}' not found")]
    TableNotFound { table: String },

    #[error("Table '{table}' requires an equality qualifier on '{column}'")]
    MissingQualifier { table: String, column: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create a token decode error
    pub fn token_decode(message: impl Into<String>) -> Self {
        Self::TokenDecode {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a response decode error
    pub fn decode(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a missing qualifier error
    pub fn missing_qualifier(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::MissingQualifier {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Whether this error comes from connection configuration
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::MissingConfigField { .. }
                | Error::YamlParse(_)
                | Error::FileNotFound { .. }
        )
    }

    /// Whether the request ran out of time, either as a whole or on the wire
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Timeout { .. } => true,
            Error::Http(e) | Error::TokenRequest { source: e } => e.is_timeout(),
            _ => false,
        }
    }

    /// Whether this error was raised while obtaining a token
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Error::TokenRequest { .. } | Error::TokenStatus { .. } | Error::TokenDecode { .. }
        )
    }

    /// Short label for the phase that failed, used as a log field
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::YamlParse(_)
            | Error::FileNotFound { .. } => "client_error",
            Error::TokenRequest { .. } | Error::TokenStatus { .. } | Error::TokenDecode { .. } => {
                "auth_error"
            }
            Error::Http(_) | Error::HttpStatus { .. } | Error::InvalidHeader(_) => "api_error",
            Error::InvalidUrl(_) | Error::Timeout { .. } => "request_error",
            Error::Decode { .. } | Error::JsonParse(_) => "decode_error",
            Error::TableNotFound { .. } | Error::MissingQualifier { .. } => "query_error",
            Error::Io(_) | Error::Other(_) => "error",
        }
    }
}

/// Result type alias for the CRC connector
pub type Result<T> = std::result::Result<T, Error>;
