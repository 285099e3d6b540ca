//! Application state shared by the REST handlers

use crate::error::{ServerError, ServerResult};
use chrono::{DateTime, Utc};
use crmgate_config::GatewayConfig;
use crmgate_openapi::{ApiMetadata, HostContext};
use crmgate_runtime::Gateway;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub config: Arc<GatewayConfig>,
    pub metadata: Arc<ApiMetadata>,
    pub started_at: DateTime<Utc>,
    started: Instant,
}

impl AppState {
    pub fn new(gateway: Arc<Gateway>, config: GatewayConfig) -> Self {
        Self {
            gateway,
            config: Arc::new(config),
            metadata: Arc::new(ApiMetadata::default()),
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    /// Build the gateway described by `config`
    pub fn from_config(config: GatewayConfig) -> ServerResult<Self> {
        let gateway = Gateway::from_config(&config).map_err(|e| ServerError::Config(e.to_string()))?;
        Ok(Self::new(Arc::new(gateway), config))
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    /// Host context for a request, falling back to the configured bind address
    pub fn host_context(&self, host: Option<&str>, forwarded_proto: Option<&str>) -> HostContext {
        let fallback = format!("{}:{}", self.config.host, self.config.port);
        HostContext::detect(host, forwarded_proto, &fallback)
    }
}
