//! MCP server command

use anyhow::Result;
use clap::Args;
use crmgate_config::GatewayConfig;
use crmgate_mcp::{serve_http, serve_stdio, McpServer};
use tracing::{info, warn};

#[derive(Args)]
pub struct ServeMcpArgs {
    /// Serve over HTTP on this address instead of stdio
    #[arg(long)]
    pub addr: Option<String>,
}

pub async fn execute(args: ServeMcpArgs, config: GatewayConfig) -> Result<()> {
    for warning in config.warnings() {
        warn!("{}", warning);
    }
    info!("Backend: {}", config.api_base_url);

    let server = McpServer::from_config(&config)?;
    match args.addr {
        Some(addr) => serve_http(server, &addr).await?,
        None => serve_stdio(server).await?,
    }
    Ok(())
}
