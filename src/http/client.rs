//! Authenticated API client
//!
//! A cheap handle over a shared [`SsoTransport`]. Handles obtained for the
//! same connection share the transport (and therefore the token), while each
//! handle carries its own timeout.

use super::transport::SsoTransport;
use crate::error::{Error, Result};
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Request, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Client for the console APIs of one connection
#[derive(Clone)]
pub struct AuthenticatedClient {
    transport: Arc<SsoTransport>,
    base_url: String,
    timeout: Duration,
}

impl AuthenticatedClient {
    /// Create a handle over an existing transport
    pub fn new(transport: Arc<SsoTransport>, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            timeout,
        }
    }

    /// Same connection, different timeout
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            base_url: self.base_url.clone(),
            timeout,
        }
    }

    /// Timeout applied to each request sent through this handle
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Base URL endpoints are resolved against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The shared authenticating transport
    pub fn transport(&self) -> &Arc<SsoTransport> {
        &self.transport
    }

    /// Whether both handles share the same underlying transport
    pub fn same_connection(&self, other: &AuthenticatedClient) -> bool {
        Arc::ptr_eq(&self.transport, &other.transport)
    }

    /// Build the full URL for an endpoint
    pub fn build_url(&self, endpoint: &str) -> Result<Url> {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return Ok(Url::parse(endpoint)?);
        }

        let base = self.base_url.trim_end_matches('/');
        let endpoint = endpoint.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{endpoint}"))?)
    }

    /// Send an arbitrary request through the authenticated transport
    ///
    /// The handle's timeout is applied unless the request already has one.
    /// It bounds the whole round trip: waiting for the token lock, any token
    /// exchange, and the request itself.
    pub async fn execute(&self, mut request: Request) -> Result<Response> {
        let timeout = *request.timeout_mut().get_or_insert(self.timeout);

        tokio::time::timeout(timeout, self.transport.round_trip(request))
            .await
            .map_err(|_| Error::Timeout { timeout })?
    }

    /// Make an API request and fail on non-success status
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Response> {
        let url = self.build_url(endpoint)?;
        let mut request = Request::new(method, url);

        let headers = request.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(body) = body {
            *request.body_mut() = Some(serde_json::to_vec(body)?.into());
        }

        let response = self.execute(request).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        debug!(endpoint, status = status.as_u16(), "Request succeeded");
        Ok(response)
    }

    /// Make a GET request
    pub async fn get(&self, endpoint: &str) -> Result<Response> {
        self.request(Method::GET, endpoint, None).await
    }

    /// Make a GET request and decode the JSON response
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let response = self.get(endpoint).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| Error::decode(endpoint, e.to_string()))
    }
}

impl std::fmt::Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
