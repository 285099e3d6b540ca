//! CRMGate MCP (Model Context Protocol) front-end
//!
//! Exposes the gateway's tool registry as MCP tools over line-delimited
//! stdio or `POST /mcp`. Every `tools/call` goes through the same
//! [`crmgate_runtime::Gateway`] as the REST front-end.

pub mod error;
pub mod jsonrpc;
pub mod protocol;
pub mod server;

pub use error::{McpError, McpResult};
pub use server::{router, serve_http, serve_lines, serve_stdio, McpServer};
