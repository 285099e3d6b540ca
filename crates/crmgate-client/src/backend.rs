//! Backend seam between the gateway and the CRM API

use crate::client::CrmClient;
use crate::client_cache::ClientCache;
use crate::endpoint::CrmEndpoint;
use crate::error::ClientResult;
use async_trait::async_trait;
use crmgate_core::{Arguments, Credential, ResponseFormat};
use serde_json::Value as JsonValue;
use std::time::Duration;

/// Backend operations available to one invocation
#[async_trait]
pub trait CrmBackend: Send + Sync {
    async fn natural_query(&self, query: &str, format: ResponseFormat) -> ClientResult<JsonValue>;

    async fn call_tool(&self, tool_name: &str, arguments: &Arguments) -> ClientResult<JsonValue>;
}

/// Produces a fresh backend per invocation, bound to that invocation's credential
pub trait BackendFactory: Send + Sync {
    fn bind(&self, credential: Credential) -> ClientResult<Box<dyn CrmBackend>>;
}

/// Factory for the real HTTPS backend
#[derive(Debug, Clone)]
pub struct HttpBackendFactory {
    endpoint: CrmEndpoint,
    clients: ClientCache,
}

impl HttpBackendFactory {
    pub fn new(endpoint: CrmEndpoint, clients: ClientCache) -> Self {
        Self { endpoint, clients }
    }

    pub fn from_base_url(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        Ok(Self::new(CrmEndpoint::new(base_url, timeout)?, ClientCache::new()))
    }

    pub fn endpoint(&self) -> &CrmEndpoint {
        &self.endpoint
    }

    /// Concrete client for callers that want the adapter itself
    pub fn client_for(&self, credential: Credential) -> ClientResult<CrmClient> {
        let http = self.clients.get_client(&self.endpoint)?;
        Ok(CrmClient::new(http, self.endpoint.clone(), credential))
    }
}

impl BackendFactory for HttpBackendFactory {
    fn bind(&self, credential: Credential) -> ClientResult<Box<dyn CrmBackend>> {
        Ok(Box::new(self.client_for(credential)?))
    }
}
