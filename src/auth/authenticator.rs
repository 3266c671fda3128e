//! Authenticator implementation
//!
//! Performs the client-credentials exchange against the SSO token endpoint.

use super::types::{ClientCredentials, TokenResponse, TokenState};
use crate::error::{Error, Result};
use crate::types::DEFAULT_TIMEOUT;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Exchanges client credentials for bearer tokens
pub struct Authenticator {
    /// Credentials and token endpoint
    credentials: ClientCredentials,
    /// HTTP client for token requests
    http_client: Client,
    /// Timeout for the token request
    timeout: Duration,
}

impl Authenticator {
    /// Create a new authenticator with its own HTTP client
    pub fn new(credentials: ClientCredentials) -> Self {
        Self::with_client(credentials, Client::new())
    }

    /// Create an authenticator with a custom HTTP client
    pub fn with_client(credentials: ClientCredentials, http_client: Client) -> Self {
        Self {
            credentials,
            http_client,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the timeout used for token requests
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch a fresh token
    ///
    /// POSTs `grant_type=client_credentials` as a form body, authenticating
    /// with HTTP Basic. Nothing is retried.
    pub async fn authenticate(&self) -> Result<TokenState> {
        debug!(token_url = %self.credentials.token_url, "Requesting access token");

        let response = self
            .http_client
            .post(&self.credentials.token_url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&[("grant_type", "client_credentials")])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| Error::TokenRequest { source })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| Error::TokenRequest { source })?;

        if !status.is_success() {
            return Err(Error::TokenStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let token = TokenResponse::from_slice(&body)?;
        let expires_in = token.expires_in;
        let state = token.into_state()?;

        info!(
            client_id = %self.credentials.client_id,
            expires_in,
            "Obtained access token"
        );
        Ok(state)
    }

    /// Get the credentials
    pub fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("credentials", &self.credentials)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
