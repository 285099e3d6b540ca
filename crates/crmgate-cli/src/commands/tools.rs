//! Tool listing command

use crate::error::CliResult;
use crate::utils::{truncate_text, ColoredOutput};
use clap::{Args, ValueEnum};
use crmgate_core::ToolRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ToolsFormat {
    Table,
    Json,
}

#[derive(Args)]
pub struct ToolsArgs {
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: ToolsFormat,
}

pub fn execute(args: ToolsArgs) -> CliResult<()> {
    println!("{}", render(&ToolRegistry::builtin(), args.format)?);
    Ok(())
}

fn render(registry: &ToolRegistry, format: ToolsFormat) -> CliResult<String> {
    match format {
        ToolsFormat::Json => Ok(serde_json::to_string_pretty(&registry.list())?),
        ToolsFormat::Table => {
            let width = registry.iter().map(|t| t.name.len()).max().unwrap_or(0);
            let mut out = Vec::with_capacity(registry.len() + 1);
            out.push(format!("{} tool(s)", ColoredOutput::success(&registry.len().to_string())));
            for tool in registry.iter() {
                out.push(format!(
                    "  {}  {}",
                    ColoredOutput::highlight(&format!("{:<width$}", tool.name, width = width)),
                    ColoredOutput::dim(&truncate_text(&tool.description, 80))
                ));
            }
            Ok(out.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_lists_every_tool() {
        let registry = ToolRegistry::builtin();
        let text = render(&registry, ToolsFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), registry.len());
        assert_eq!(parsed[0]["name"], "natural_query");
        assert!(parsed[0]["inputSchema"].is_object());
    }

    #[test]
    fn table_has_a_line_per_tool() {
        colored::control::set_override(false);
        let registry = ToolRegistry::builtin();
        let text = render(&registry, ToolsFormat::Table).unwrap();
        assert_eq!(text.lines().count(), registry.len() + 1);
        assert!(text.contains("search_entities"));
    }
}
