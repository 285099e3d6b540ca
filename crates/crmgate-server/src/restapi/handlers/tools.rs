//! Tool listing and execution handlers

use crate::dto::{ServerInfo, ToolCallRequest, ToolResponse, ToolSummary, ToolsListResponse};
use crate::error::ServerError;
use crate::middleware::RequestId;
use crate::restapi::handlers::parse_body;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Extension, Path, State},
    response::{Json, Response},
};
use crmgate_core::{Arguments, Credential, GatewayError};
use serde_json::Value;

/// GET /tools
pub async fn list_tools(State(state): State<AppState>) -> Json<ToolsListResponse> {
    let tools = state
        .gateway
        .registry()
        .iter()
        .map(|t| ToolSummary {
            name: t.name.clone(),
            description: t.description.clone(),
            parameters: t.input_schema.clone(),
        })
        .collect();

    Json(ToolsListResponse {
        tools,
        server_info: ServerInfo {
            name: "crmgate".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            capabilities: vec!["natural_language_queries".to_string(), "crm_data_access".to_string()],
        },
    })
}

/// POST /tools
pub async fn execute_tool(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Extension(credential): Extension<Credential>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ToolResponse>, Response> {
    let request: ToolCallRequest = parse_body(body).map_err(|e| e.to_http_response(request_id.as_str()))?;
    let name = match request.tool_name() {
        Some(name) => name.to_string(),
        None => {
            let err = GatewayError::invalid_argument("name", "Tool name is required");
            return Err(ServerError::from(err).to_http_response(request_id.as_str()));
        }
    };

    invoke(&state, &request_id, &name, request.arguments.unwrap_or_default(), credential).await
}

/// POST /tools/:tool, body is the tool's arguments
pub async fn execute_named_tool(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Extension(credential): Extension<Credential>,
    Path(tool): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ToolResponse>, Response> {
    let registry = state.gateway.registry();
    let name = registry
        .get_by_dash_name(&tool)
        .or_else(|| registry.get(&tool))
        .map(|t| t.name.clone())
        .ok_or_else(|| ServerError::from(GatewayError::UnknownTool(tool.clone())).to_http_response(request_id.as_str()))?;

    let arguments = match parse_body::<Value>(body).map_err(|e| e.to_http_response(request_id.as_str()))? {
        Value::Null => Arguments::new(),
        Value::Object(map) => map,
        _ => {
            let err = GatewayError::invalid_argument("arguments", "request body must be a JSON object");
            return Err(ServerError::from(err).to_http_response(request_id.as_str()));
        }
    };

    invoke(&state, &request_id, &name, arguments, credential).await
}

async fn invoke(
    state: &AppState,
    request_id: &RequestId,
    name: &str,
    arguments: Arguments,
    credential: Credential,
) -> Result<Json<ToolResponse>, Response> {
    let result = state
        .gateway
        .invoke(name, arguments, credential)
        .await
        .map_err(|e| ServerError::from(e).to_http_response(request_id.as_str()))?;

    Ok(Json(ToolResponse { result: result.text, tool_name: result.tool_name, success: result.succeeded }))
}
