//! CRMGate CLI main entry point

use clap::Parser;
use crmgate_cli::{
    cli::{Cli, Commands},
    commands,
    error::CliResult,
    utils::{init_tracing, ColoredOutput},
};
use crmgate_config::GatewayConfig;
use std::path::Path;
use tracing::{debug, info};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{} {}", ColoredOutput::error("Error:"), e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose)?;

    if cli.no_color {
        colored::control::set_override(false);
    }

    debug!("CRMGate CLI v{}", env!("CARGO_PKG_VERSION"));

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve { args } => commands::serve::execute(args, load(config_path)?).await.map_err(Into::into),
        Commands::ServeMcp { args } => {
            commands::serve_mcp::execute(args, load(config_path)?).await.map_err(Into::into)
        }
        Commands::GenerateSchema { args } => commands::generate_schema::execute(args, &load(config_path)?),
        Commands::Tools { args } => commands::tools::execute(args),
    }
}

fn load(path: Option<&Path>) -> CliResult<GatewayConfig> {
    let config = crmgate_config::load_config(path)?;
    if let Some(path) = path {
        info!("Loaded configuration from {}", path.display());
    }
    Ok(config)
}
