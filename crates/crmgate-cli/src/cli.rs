//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "crmgate",
    about = "CRMGate - CRM tool invocation gateway",
    version,
    author = "CRMGate Team"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (YAML or JSON); environment variables override it
    #[arg(long, global = true, env = "CRMGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server, optionally with MCP over HTTP
    Serve {
        #[command(flatten)]
        args: crate::commands::ServeArgs,
    },
    /// Start the MCP server (stdio unless --addr is given)
    ServeMcp {
        #[command(flatten)]
        args: crate::commands::ServeMcpArgs,
    },
    /// Write the OpenAPI document for the tool registry
    GenerateSchema {
        #[command(flatten)]
        args: crate::commands::GenerateSchemaArgs,
    },
    /// List the registered tools
    Tools {
        #[command(flatten)]
        args: crate::commands::ToolsArgs,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::ToolsFormat;

    #[test]
    fn serve_parsing() {
        let cli = Cli::try_parse_from([
            "crmgate",
            "--config",
            "/etc/crmgate.yaml",
            "serve",
            "--port",
            "9000",
            "--mcp-http",
            "127.0.0.1:9001",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/etc/crmgate.yaml")));
        match cli.command {
            Commands::Serve { args } => {
                assert_eq!(args.port, Some(9000));
                assert_eq!(args.host, None);
                assert_eq!(args.mcp_http.as_deref(), Some("127.0.0.1:9001"));
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["crmgate", "tools", "--format", "json", "-v", "--no-color"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.no_color);
        match cli.command {
            Commands::Tools { args } => assert_eq!(args.format, ToolsFormat::Json),
            _ => panic!("Expected Tools command"),
        }
    }

    #[test]
    fn generate_schema_defaults() {
        let cli = Cli::try_parse_from(["crmgate", "generate-schema"]).unwrap();
        match cli.command {
            Commands::GenerateSchema { args } => {
                assert_eq!(args.output, PathBuf::from("openapi.yaml"));
                assert!(args.format.is_none());
                assert!(args.server_url.is_none());
            }
            _ => panic!("Expected GenerateSchema command"),
        }
    }

    #[test]
    fn serve_mcp_parsing() {
        let cli = Cli::try_parse_from(["crmgate", "serve-mcp"]).unwrap();
        assert!(matches!(cli.command, Commands::ServeMcp { args } if args.addr.is_none()));

        assert!(Cli::try_parse_from(["crmgate", "tools", "--format", "xml"]).is_err());
        assert!(Cli::try_parse_from(["crmgate", "serve", "--port", "http"]).is_err());
    }
}
