//! CRMGate Server
//!
//! REST front-end for the gateway, optionally alongside MCP over HTTP.
//! Both front-ends share one [`crmgate_runtime::Gateway`], so rate limits
//! apply per caller across transports.

pub mod app_state;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod restapi;

pub use app_state::AppState;
pub use error::{ServerError, ServerResult};
pub use restapi::create_router;

use crmgate_mcp::McpServer;
use tokio::task::JoinSet;

// REST API
pub async fn serve_rest(app_state: AppState, addr: &str) -> ServerResult<()> {
    restapi::serve(app_state, addr).await
}

/// Unified server: run REST and/or MCP endpoints concurrently in one process
#[derive(Debug, Clone, Default)]
pub struct ServeConfig {
    pub rest_addr: Option<String>,
    pub mcp_http_addr: Option<String>,
}

/// Runs until every service stops. The first service to fail stops the
/// others and its error is returned.
pub async fn serve_unified(app_state: AppState, cfg: ServeConfig) -> ServerResult<()> {
    let mut tasks: JoinSet<ServerResult<()>> = JoinSet::new();
    if let Some(addr) = cfg.rest_addr.clone() {
        let st = app_state.clone();
        tasks.spawn(async move { restapi::serve(st, &addr).await });
    }
    if let Some(addr) = cfg.mcp_http_addr.clone() {
        let mcp = McpServer::new(app_state.gateway.clone(), app_state.config.auth_token.clone());
        tasks.spawn(async move { crmgate_mcp::serve_http(mcp, &addr).await.map_err(ServerError::from) });
    }

    if tasks.is_empty() {
        return Err(ServerError::InvalidInput("No services configured to run".to_string()));
    }

    while let Some(joined) = tasks.join_next().await {
        let outcome = joined
            .map_err(|e| ServerError::Internal(format!("Join error: {}", e)))
            .and_then(|r| r);
        if let Err(e) = outcome {
            tracing::error!("Service failed, stopping the rest: {}", e);
            tasks.abort_all();
            return Err(e);
        }
    }
    Ok(())
}
