pub mod generate_schema;
pub mod serve;
pub mod serve_mcp;
pub mod tools;

// Re-export command handlers
pub use generate_schema::GenerateSchemaArgs;
pub use serve::ServeArgs;
pub use serve_mcp::ServeMcpArgs;
pub use tools::{ToolsArgs, ToolsFormat};
