//! OpenAPI document generation command

use crate::error::{CliError, CliResult};
use clap::Args;
use crmgate_config::GatewayConfig;
use crmgate_core::ToolRegistry;
use crmgate_openapi::{project, render_document, ApiMetadata, DocumentFormat, HostContext};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct GenerateSchemaArgs {
    /// Output file; `-` writes to stdout
    #[arg(short, long, default_value = "openapi.yaml")]
    pub output: PathBuf,

    /// yaml or json (default: from the output extension)
    #[arg(long)]
    pub format: Option<String>,

    /// Public base URL advertised in `servers`
    #[arg(long)]
    pub server_url: Option<String>,
}

pub fn execute(args: GenerateSchemaArgs, config: &GatewayConfig) -> CliResult<()> {
    let document = build(&args, config)?;
    if args.output.as_os_str() == "-" {
        println!("{}", document);
        return Ok(());
    }

    std::fs::write(&args.output, document)?;
    eprintln!(
        "{} {}",
        crate::utils::ColoredOutput::success("Wrote"),
        args.output.display()
    );
    Ok(())
}

fn build(args: &GenerateSchemaArgs, config: &GatewayConfig) -> CliResult<String> {
    let format = match &args.format {
        Some(f) => f.parse::<DocumentFormat>()?,
        None => format_from_path(&args.output),
    };

    let host = match &args.server_url {
        Some(url) => HostContext::from_server_url(url).ok_or_else(|| {
            CliError::InvalidArgument(format!("server URL must be http(s)://host[:port], got '{}'", url))
        })?,
        None => HostContext::detect(None, None, &format!("{}:{}", config.host, config.port)),
    };

    let registry = ToolRegistry::builtin();
    let document = project(&registry.list(), &host, &ApiMetadata::default());
    Ok(render_document(&document, format)?)
}

fn format_from_path(path: &Path) -> DocumentFormat {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(|e| e.parse().ok())
        .unwrap_or_default()
}
