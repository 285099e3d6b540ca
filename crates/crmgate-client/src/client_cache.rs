//! Shared HTTP clients keyed by backend destination.
//!
//! Connection pools are shared between callers of the same destination only.
//! Nothing caller-specific is ever set on a pooled client; the credential is
//! attached per request.

use crate::endpoint::CrmEndpoint;
use crate::error::{ClientError, ClientResult};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    authority: String,
    connect_timeout_ms: u64,
}

impl ClientKey {
    fn for_endpoint(endpoint: &CrmEndpoint) -> Self {
        Self {
            authority: endpoint.authority(),
            connect_timeout_ms: endpoint.timeout().min(MAX_CONNECT_TIMEOUT).as_millis() as u64,
        }
    }

    fn build_client(&self) -> ClientResult<Client> {
        Client::builder()
            .connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .user_agent(concat!("crmgate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("Failed to build HTTP client: {}", e)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientCache {
    cache: Arc<RwLock<HashMap<ClientKey, Arc<Client>>>>,
}

impl ClientCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the pooled client for this destination
    pub fn get_client(&self, endpoint: &CrmEndpoint) -> ClientResult<Arc<Client>> {
        let key = ClientKey::for_endpoint(endpoint);

        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(client) = cache.get(&key) {
                return Ok(client.clone());
            }
        }

        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        // another task may have inserted while we waited for the write lock
        if let Some(client) = cache.get(&key) {
            return Ok(client.clone());
        }
        let client = Arc::new(key.build_client()?);
        cache.insert(key, client.clone());
        Ok(client)
    }

    pub fn len(&self) -> usize {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
