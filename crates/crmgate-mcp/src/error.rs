//! Error handling for the MCP front-end

use crate::jsonrpc::JsonRpcError;
use thiserror::Error;

pub type McpResult<T> = Result<T, McpError>;

#[derive(Debug, Error)]
pub enum McpError {
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid params: {0}")]
    InvalidArguments(String),

    #[error("Unknown tool: {0}")]
    ToolNotFound(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl McpError {
    pub fn to_jsonrpc_error(&self) -> JsonRpcError {
        match self {
            McpError::Parse(e) => {
                JsonRpcError::parse_error().with_data(serde_json::json!({ "message": e.to_string() }))
            }
            McpError::InvalidArguments(msg) => {
                JsonRpcError::invalid_params().with_data(serde_json::json!({ "message": msg }))
            }
            McpError::ToolNotFound(name) => JsonRpcError::invalid_params()
                .with_data(serde_json::json!({ "message": format!("Unknown tool: {}", name) })),
            _ => JsonRpcError::internal_error().with_data(serde_json::json!({
                "message": self.to_string()
            })),
        }
    }
}
