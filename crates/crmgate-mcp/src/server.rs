//! MCP server: JSON-RPC dispatch plus stdio and HTTP transports

use crate::error::{McpError, McpResult};
use crate::jsonrpc::{
    error_response, success_response, JsonRpcError, JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION,
};
use crate::protocol::{
    negotiate_version, CallToolParams, CallToolResult, Implementation, InitializeParams,
    InitializeResult, ServerCapabilities, Tool, ToolsCapability, ToolsListResult,
    LATEST_PROTOCOL_VERSION, METHOD_INITIALIZE, METHOD_PING, METHOD_TOOLS_CALL, METHOD_TOOLS_LIST,
    SUPPORTED_PROTOCOL_VERSIONS,
};
use crmgate_config::GatewayConfig;
use crmgate_core::{Credential, GatewayError, GatewayResult, NATURAL_QUERY_TOOL};
use crmgate_runtime::Gateway;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, warn};

pub struct McpServer {
    gateway: Arc<Gateway>,
    /// Used when a call carries no credential of its own
    fallback_token: Option<String>,
}

impl McpServer {
    pub fn new(gateway: Arc<Gateway>, fallback_token: Option<String>) -> Self {
        Self { gateway, fallback_token }
    }

    pub fn from_config(config: &GatewayConfig) -> McpResult<Self> {
        let gateway = Gateway::from_config(config).map_err(|e| McpError::Config(e.to_string()))?;
        Ok(Self::new(Arc::new(gateway), config.auth_token.clone()))
    }

    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    /// Process a single MCP message.
    ///
    /// `authorization` is the transport-level `Authorization` header, if the
    /// transport has one. Returns `None` for notifications.
    pub async fn process_message(
        &self,
        body: &[u8],
        authorization: Option<&str>,
    ) -> McpResult<Option<JsonRpcResponse>> {
        let request: JsonRpcRequest = serde_json::from_slice(body).map_err(|e| {
            debug!("Failed to parse JSON-RPC request: {}", e);
            McpError::Parse(e)
        })?;

        debug!(method = %request.method, "Processing MCP message");

        if request.jsonrpc != JSONRPC_VERSION {
            return Ok(Some(error_response(
                request.id,
                JsonRpcError::invalid_request()
                    .with_data(serde_json::json!({"message": "Invalid JSON-RPC version"})),
            )));
        }

        if request.id.is_none() {
            debug!(method = %request.method, "Received notification, ignoring");
            return Ok(None);
        }

        let outcome = match request.method.as_str() {
            METHOD_INITIALIZE => self.handle_initialize(&request),
            METHOD_PING => Ok(serde_json::json!({})),
            METHOD_TOOLS_LIST => self.handle_tools_list(),
            METHOD_TOOLS_CALL => self.handle_tools_call(&request, authorization).await,
            _ => {
                return Ok(Some(error_response(
                    request.id,
                    JsonRpcError::method_not_found()
                        .with_data(serde_json::json!({"method": request.method})),
                )))
            }
        };

        Ok(Some(match outcome {
            Ok(result) => success_response(request.id, result),
            Err(e) => {
                warn!(method = %request.method, error = %e, "MCP request failed");
                error_response(request.id, e.to_jsonrpc_error())
            }
        }))
    }

    fn handle_initialize(&self, request: &JsonRpcRequest) -> McpResult<Value> {
        let params = request
            .params
            .as_ref()
            .ok_or_else(|| McpError::InvalidArguments("Missing params for initialize".to_string()))?;
        let init: InitializeParams = serde_json::from_value(params.clone())
            .map_err(|e| McpError::InvalidArguments(e.to_string()))?;

        if let Some(client) = &init.client_info {
            info!(client = %client.name, version = %client.version, "MCP client connected");
        }

        let response = InitializeResult {
            protocol_version: negotiate_version(&init.protocol_version).to_string(),
            capabilities: ServerCapabilities { tools: ToolsCapability { list_changed: false } },
            server_info: Implementation {
                name: "crmgate".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("CRMGate MCP".to_string()),
            },
            instructions: Some(
                "CRM tools: query CRM data in natural language with natural_query, or call a specific tool"
                    .to_string(),
            ),
        };
        Ok(serde_json::to_value(response)?)
    }

    fn handle_tools_list(&self) -> McpResult<Value> {
        let tools = self
            .gateway
            .registry()
            .iter()
            .map(|t| Tool {
                name: t.name.clone(),
                description: t.description.clone(),
                input_schema: t.input_schema.clone(),
            })
            .collect();
        Ok(serde_json::to_value(ToolsListResult { tools, next_cursor: None })?)
    }

    async fn handle_tools_call(
        &self,
        request: &JsonRpcRequest,
        authorization: Option<&str>,
    ) -> McpResult<Value> {
        let params = request
            .params
            .as_ref()
            .ok_or_else(|| McpError::InvalidArguments("Missing params for tools/call".to_string()))?;
        let call: CallToolParams = serde_json::from_value(params.clone())
            .map_err(|e| McpError::InvalidArguments(e.to_string()))?;

        if call.name != NATURAL_QUERY_TOOL && self.gateway.registry().get(&call.name).is_none() {
            return Err(McpError::ToolNotFound(call.name));
        }

        let result = match self.resolve_credential(&call, authorization) {
            Ok(credential) => {
                let arguments = call.arguments.clone().unwrap_or_default();
                self.gateway.invoke(&call.name, arguments, credential).await
            }
            Err(e) => Err(e),
        };

        let response = match result {
            Ok(invocation) => CallToolResult::text(invocation.text),
            Err(e) => CallToolResult::error(format!("Error ({}): {}", e.kind(), e.public_message())),
        };
        Ok(serde_json::to_value(response)?)
    }

    /// `_meta.authorization`, then the transport header, then the configured token
    fn resolve_credential(
        &self,
        call: &CallToolParams,
        authorization: Option<&str>,
    ) -> GatewayResult<Credential> {
        if let Some(meta) = call.meta_authorization() {
            return parse_token(meta);
        }
        if authorization.is_some() {
            return Credential::from_authorization_header(authorization);
        }
        match &self.fallback_token {
            Some(token) => Credential::new(token.as_str()),
            None => Err(GatewayError::Unauthorized(
                "No credential: send _meta.authorization or configure CRMGATE_AUTH_TOKEN".to_string(),
            )),
        }
    }
}

/// Accept either `Bearer <token>` or a bare token
fn parse_token(value: &str) -> GatewayResult<Credential> {
    let trimmed = value.trim();
    if trimmed.contains(char::is_whitespace) {
        Credential::from_authorization_header(Some(trimmed))
    } else {
        Credential::new(trimmed)
    }
}

/// Line-delimited JSON-RPC over any reader/writer pair
pub async fn serve_lines<R, W>(server: &McpServer, reader: R, mut writer: W) -> McpResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = if trimmed.starts_with('[') {
            error!("Batch requests are not supported");
            Some(error_response(
                None,
                JsonRpcError::invalid_request()
                    .with_data(serde_json::json!({"message": "Batch requests are not supported"})),
            ))
        } else {
            match server.process_message(trimmed.as_bytes(), None).await {
                Ok(response) => response,
                Err(e) => {
                    error!("Error processing message: {}", e);
                    Some(error_response(None, e.to_jsonrpc_error()))
                }
            }
        };

        if let Some(response) = response {
            let mut out = serde_json::to_vec(&response)?;
            out.push(b'\n');
            writer.write_all(&out).await?;
            writer.flush().await?;
        }
    }
    Ok(())
}

/// Serve MCP over stdin/stdout. Logs must go to stderr.
pub async fn serve_stdio(server: McpServer) -> McpResult<()> {
    info!("Starting CRMGate MCP server (stdio mode)");
    if server.fallback_token.is_none() {
        warn!("No auth token configured; every tools/call must carry _meta.authorization");
    }
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    serve_lines(&server, stdin, tokio::io::stdout()).await?;
    info!("MCP server stopped");
    Ok(())
}

/// Router exposing `POST /mcp`
pub fn router(server: Arc<McpServer>) -> axum::Router {
    use axum::{
        body::Bytes,
        extract::State,
        http::{header, HeaderMap, HeaderValue, StatusCode},
        response::{IntoResponse, Json, Response},
        routing::post,
    };

    fn protocol_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("mcp-protocol-version", HeaderValue::from_static(LATEST_PROTOCOL_VERSION));
        if let Ok(session) = HeaderValue::from_str(&uuid::Uuid::new_v4().to_string()) {
            headers.insert("mcp-session-id", session);
        }
        headers
    }

    async fn handle_mcp_request(State(server): State<Arc<McpServer>>, headers: HeaderMap, body: Bytes) -> Response {
        if let Some(version) = headers.get("mcp-protocol-version") {
            let version = version.to_str().unwrap_or("");
            if !SUPPORTED_PROTOCOL_VERSIONS.contains(&version) {
                warn!("Unsupported MCP protocol version: {}", version);
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({
                        "error": "Unsupported MCP protocol version",
                        "supported_versions": SUPPORTED_PROTOCOL_VERSIONS
                    })),
                )
                    .into_response();
            }
        }

        let authorization = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
        if body.first().is_some_and(|b| *b == b'[') {
            let response = error_response(
                None,
                JsonRpcError::invalid_request()
                    .with_data(serde_json::json!({"message": "Batch requests are not supported"})),
            );
            return (StatusCode::BAD_REQUEST, protocol_headers(), Json(response)).into_response();
        }

        match server.process_message(&body, authorization).await {
            Ok(Some(response)) => (protocol_headers(), Json(response)).into_response(),
            Ok(None) => (StatusCode::ACCEPTED, protocol_headers()).into_response(),
            Err(e) => {
                error!("Error processing MCP request: {}", e);
                let status = match e {
                    McpError::Parse(_) | McpError::InvalidArguments(_) => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, protocol_headers(), Json(error_response(None, e.to_jsonrpc_error()))).into_response()
            }
        }
    }

    axum::Router::new().route("/mcp", post(handle_mcp_request)).with_state(server)
}

/// Serve MCP over HTTP (`POST /mcp`) until ctrl-c
pub async fn serve_http(server: McpServer, addr: &str) -> McpResult<()> {
    info!("Starting CRMGate MCP server (HTTP mode) on {}", addr);
    let app = router(Arc::new(server));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| McpError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("HTTP MCP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| McpError::Internal(format!("HTTP server error: {}", e)))?;

    info!("HTTP MCP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_with_or_without_scheme() {
        assert_eq!(parse_token("Bearer abc").unwrap().expose(), "abc");
        assert_eq!(parse_token("bearer abc").unwrap().expose(), "abc");
        assert_eq!(parse_token("abc").unwrap().expose(), "abc");
        assert!(parse_token("  ").is_err());
        assert!(parse_token("Basic abc").is_err());
    }
}
