//! Auth types
//!
//! Client credentials, the token endpoint response, and the token state
//! shared by every request issued through one transport.

use crate::error::{Error, Result};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

/// Client-credentials pair plus the endpoint that exchanges it for a token
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// Token endpoint URL
    pub token_url: String,
    /// Client ID (Basic auth username)
    pub client_id: String,
    /// Client secret (Basic auth password)
    pub client_secret: String,
}

impl ClientCredentials {
    /// Create a new set of client credentials
    pub fn new(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Body returned by the token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// The bearer token
    pub access_token: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

impl TokenResponse {
    /// Parse a token endpoint body
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let response: TokenResponse =
            serde_json::from_slice(body).map_err(|e| Error::token_decode(e.to_string()))?;
        if response.access_token.is_empty() {
            return Err(Error::token_decode("empty access_token"));
        }
        Ok(response)
    }

    /// Convert into token state, measuring the lifetime from `now`
    pub fn into_state_at(self, now: DateTime<Utc>) -> Result<TokenState> {
        let lifetime = TimeDelta::try_seconds(self.expires_in).ok_or_else(|| {
            Error::token_decode(format!("expires_in out of range: {}", self.expires_in))
        })?;
        let expires_at = now
            .checked_add_signed(lifetime)
            .ok_or_else(|| Error::token_decode("expiry overflows the calendar"))?;
        Ok(TokenState::new(self.access_token, expires_at))
    }

    /// Convert into token state, measuring the lifetime from the current time
    pub fn into_state(self) -> Result<TokenState> {
        self.into_state_at(Utc::now())
    }
}

/// Current access token and its expiry
///
/// The default state holds no token and is always expired, so the first
/// request through a fresh transport authenticates.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenState {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl TokenState {
    /// Create a token state
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    /// The bearer token
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// When the token stops being valid
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the token must be refreshed at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.access_token.is_empty() || now >= self.expires_at
    }

    /// Whether the token must be refreshed before the next request
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl Default for TokenState {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            expires_at: DateTime::<Utc>::MIN_UTC,
        }
    }
}

impl std::fmt::Debug for TokenState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenState")
            .field("has_token", &!self.access_token.is_empty())
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
