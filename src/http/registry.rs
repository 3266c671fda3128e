//! Client registry
//!
//! Caches one [`SsoTransport`] per connection so repeated queries reuse the
//! token instead of authenticating again. The registry is owned by the
//! caller; there is no process-wide cache.

use super::client::AuthenticatedClient;
use super::transport::SsoTransport;
use crate::config::ConnectionConfig;
use crate::error::Result;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Registry of authenticated transports, one per connection
///
/// Keyed by the whole configuration, so two connections share a transport
/// only when every field matches.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    transports: DashMap<ConnectionConfig, Arc<SsoTransport>>,
}

impl ClientRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a client for `config`, creating and caching its transport on first use
    ///
    /// The configuration is validated before the cache is consulted, so an
    /// incomplete configuration never reaches the network. The returned handle
    /// uses `timeout` for its requests; handles for the same connection share
    /// one transport but not their timeouts.
    pub fn get_client(
        &self,
        config: &ConnectionConfig,
        timeout: Duration,
    ) -> Result<AuthenticatedClient> {
        config.validate()?;
        let transport = match self.transports.entry(config.clone()) {
            Entry::Occupied(entry) => {
                debug!(base_url = %config.base_url, "Reusing cached client");
                Arc::clone(entry.get())
            }
            Entry::Vacant(entry) => {
                debug!(base_url = %config.base_url, "Creating authenticated client");
                let transport = Arc::new(SsoTransport::new(config.credentials())?);
                entry.insert(Arc::clone(&transport));
                transport
            }
        };

        Ok(AuthenticatedClient::new(
            transport,
            config.base_url.clone(),
            timeout,
        ))
    }

    /// Drop the cached client for `config`, returning whether one existed
    pub fn evict(&self, config: &ConnectionConfig) -> bool {
        self.transports
            .remove(config)
            .is_some()
    }

    /// Number of cached connections
    pub fn len(&self) -> usize {
        self.transports.len()
    }

    /// Whether the registry holds no connections
    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }
}
