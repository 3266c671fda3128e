//! Authenticating transport
//!
//! [`SsoTransport`] sits in front of a plain [`Transport`] and makes sure
//! every request leaves with a valid bearer token:
//!
//! 1. lock the token state
//! 2. if the token is missing or `now >= expiry`, authenticate
//! 3. set `Authorization: Bearer <token>` on the request
//! 4. release the lock and hand the request to the inner transport
//!
//! Steps 1-3 run as one critical section, so concurrent requests through the
//! same transport never race to refresh the token and never observe a
//! half-written one.

use crate::auth::{Authenticator, ClientCredentials, TokenState};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, Request, Response};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Sends a prepared request and returns the raw response
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a single request
    async fn execute(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl Transport for Client {
    async fn execute(&self, request: Request) -> Result<Response> {
        Ok(Client::execute(self, request).await?)
    }
}

/// Transport that attaches a client-credentials bearer token to each request
pub struct SsoTransport {
    authenticator: Authenticator,
    token: Mutex<TokenState>,
    inner: Arc<dyn Transport>,
}

impl SsoTransport {
    /// Create a transport that sends through a fresh reqwest client
    pub fn new(credentials: ClientCredentials) -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("crc-connector/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(credentials, client))
    }

    /// Create a transport sharing one reqwest client for tokens and requests
    pub fn with_client(credentials: ClientCredentials, client: Client) -> Self {
        let authenticator = Authenticator::with_client(credentials, client.clone());
        Self::with_transport(authenticator, Arc::new(client))
    }

    /// Create a transport over an arbitrary inner transport
    pub fn with_transport(authenticator: Authenticator, inner: Arc<dyn Transport>) -> Self {
        Self {
            authenticator,
            token: Mutex::new(TokenState::default()),
            inner,
        }
    }

    /// Replace the current token state
    pub async fn set_token(&self, state: TokenState) {
        *self.token.lock().await = state;
    }

    /// Snapshot of the current token state
    pub async fn token(&self) -> TokenState {
        self.token.lock().await.clone()
    }

    /// Force a token exchange regardless of the current expiry
    pub async fn authenticate(&self) -> Result<()> {
        let mut token = self.token.lock().await;
        *token = self.authenticator.authenticate().await?;
        Ok(())
    }

    /// Attach a valid bearer token and send the request
    ///
    /// An authentication failure aborts the request before it is sent. Errors
    /// from the inner transport are returned unchanged.
    pub async fn round_trip(&self, mut request: Request) -> Result<Response> {
        {
            let mut token = self.token.lock().await;
            if token.is_expired() {
                debug!(url = %request.url(), "Access token missing or expired, authenticating");
                *token = self.authenticator.authenticate().await?;
            }

            let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token.access_token()))
                .map_err(Error::InvalidHeader)?;
            bearer.set_sensitive(true);
            request.headers_mut().insert(AUTHORIZATION, bearer);
        }

        debug!(method = %request.method(), url = %request.url(), "Sending request");
        self.inner.execute(request).await
    }

    /// The authenticator used for token exchanges
    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }
}

impl std::fmt::Debug for SsoTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SsoTransport")
            .field("authenticator", &self.authenticator)
            .finish_non_exhaustive()
    }
}
