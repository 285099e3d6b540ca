//! REST server command

use anyhow::{Context, Result};
use clap::Args;
use crmgate_config::GatewayConfig;
use crmgate_server::{serve_unified, AppState, ServeConfig};
use tracing::{info, warn};

#[derive(Args)]
pub struct ServeArgs {
    /// Interface to bind (overrides CRMGATE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides CRMGATE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Also serve MCP over HTTP on this address
    #[arg(long = "mcp-http")]
    pub mcp_http: Option<String>,
}

pub async fn execute(args: ServeArgs, mut config: GatewayConfig) -> Result<()> {
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    config.validate().context("invalid configuration")?;
    for warning in config.warnings() {
        warn!("{}", warning);
    }

    let rest_addr = config.bind_addr();
    info!("Starting CRMGate");
    info!("Backend: {}", config.api_base_url);
    info!(
        "Rate limit: {} requests / {}s per caller",
        config.rate_limit.max_requests, config.rate_limit.window_secs
    );

    let app_state = AppState::from_config(config)?;
    let cfg = ServeConfig { rest_addr: Some(rest_addr), mcp_http_addr: args.mcp_http };
    serve_unified(app_state, cfg).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;

    #[tokio::test]
    async fn invalid_config_fails_before_binding() {
        let mut config = GatewayConfig::default();
        config.rate_limit.max_requests = 0;
        let args = ServeArgs { host: None, port: Some(0), mcp_http: None };

        let err = execute(args, config).await.unwrap_err();
        match CliError::from(err) {
            CliError::General(msg) => assert!(msg.starts_with("invalid configuration: "), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
