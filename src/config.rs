//! Connection configuration
//!
//! A connection is described by four values: the API base URL, the SSO
//! token URL, and the client-credentials pair. Values come from environment
//! variables by default; connection-level settings (a YAML connection file
//! or CLI flags) take precedence when present.

use crate::auth::ClientCredentials;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable holding the API base URL
pub const ENV_BASE_URL: &str = "CRC_URL";

/// Environment variable holding the SSO token URL
pub const ENV_TOKEN_URL: &str = "CRC_TOKEN_URL";

/// Environment variable holding the client ID
pub const ENV_CLIENT_ID: &str = "CRC_CLIENT_ID";

/// Environment variable holding the client secret
pub const ENV_CLIENT_SECRET: &str = "CRC_CLIENT_SECRET";

// ============================================================================
// Connection Config
// ============================================================================

/// Fully resolved connection configuration
///
/// Immutable for the lifetime of a connection. Use [`ConnectionConfig::validate`]
/// before handing it to the transport; the client registry does this for you.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Base URL of the console APIs (e.g. `https://console.redhat.com/`)
    pub base_url: String,
    /// SSO token endpoint
    pub token_url: String,
    /// OAuth2 client ID
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: String,
}

impl ConnectionConfig {
    /// Create a new connection config
    pub fn new(
        base_url: impl Into<String>,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Resolve a config from environment defaults and connection overrides
    pub fn resolve(overrides: &ConnectionOverrides) -> Self {
        Self::resolve_with(overrides, |name| std::env::var(name).ok())
    }

    /// Resolve a config using a custom variable lookup
    pub fn resolve_with<F>(overrides: &ConnectionOverrides, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |value: &Option<String>, env: &str| {
            value
                .clone()
                .or_else(|| lookup(env))
                .unwrap_or_default()
        };

        Self {
            base_url: pick(&overrides.base_url, ENV_BASE_URL),
            token_url: pick(&overrides.token_url, ENV_TOKEN_URL),
            client_id: pick(&overrides.client_id, ENV_CLIENT_ID),
            client_secret: pick(&overrides.client_secret, ENV_CLIENT_SECRET),
        }
    }

    /// Check that every required field is present
    ///
    /// Fields are checked in declaration order and the first empty one is
    /// reported.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("base_url", &self.base_url),
            ("token_url", &self.token_url),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
        ];

        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(Error::missing_field(name));
            }
        }
        Ok(())
    }

    /// Credentials used against the token endpoint
    pub fn credentials(&self) -> ClientCredentials {
        ClientCredentials::new(&self.token_url, &self.client_id, &self.client_secret)
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("base_url", &self.base_url)
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Connection Overrides
// ============================================================================

/// Connection-level settings, each optional
///
/// Anything left unset falls back to the matching `CRC_*` environment variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionOverrides {
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<String>,
    /// Token URL override
    #[serde(default)]
    pub token_url: Option<String>,
    /// Client ID override
    #[serde(default)]
    pub client_id: Option<String>,
    /// Client secret override
    #[serde(default)]
    pub client_secret: Option<String>,
}

impl ConnectionOverrides {
    /// Parse overrides from a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load overrides from a YAML connection file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents).map_err(|e| {
            Error::config(format!("invalid connection file {}: {e}", path.display()))
        })
    }

    /// Layer `other` on top of `self`; values set in `other` win
    #[must_use]
    pub fn merge(self, other: ConnectionOverrides) -> Self {
        Self {
            base_url: other.base_url.or(self.base_url),
            token_url: other.token_url.or(self.token_url),
            client_id: other.client_id.or(self.client_id),
            client_secret: other.client_secret.or(self.client_secret),
        }
    }
}
