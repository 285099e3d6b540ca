//! Discovery documents: endpoint index, OpenAPI and plugin manifest

use crate::error::ServerError;
use crate::middleware::RequestId;
use crate::restapi::handlers::header;
use crate::AppState;
use axum::{
    extract::{Extension, State},
    http::{header::CONTENT_TYPE, HeaderMap, HeaderValue},
    response::{IntoResponse, Json, Response},
};
use crmgate_openapi::{plugin_manifest, project, render_document, DocumentFormat, HostContext, PluginManifest};
use serde_json::{json, Value};

fn host_of(state: &AppState, headers: &HeaderMap) -> HostContext {
    state.host_context(header(headers, "host"), header(headers, "x-forwarded-proto"))
}

/// GET /
pub async fn root_docs(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "name": format!("{} Actions API", state.metadata.name_for_human),
        "version": env!("CARGO_PKG_VERSION"),
        "description": state.metadata.description,
        "endpoints": {
            "GET /": "API documentation",
            "GET /health": "Health check",
            "GET /tools": "List available tools",
            "POST /tools": "Execute a tool by name",
            "POST /tools/{tool-name}": "Execute a specific tool",
            "POST /query": "Natural language query",
            "GET /openapi.json": "OpenAPI document (JSON)",
            "GET /openapi.yaml": "OpenAPI document (YAML)",
            "GET /.well-known/ai-plugin.json": "Plugin manifest"
        },
        "authentication": {
            "type": "Bearer Token",
            "description": "Include JWT token in Authorization header"
        }
    }))
}

async fn openapi(state: AppState, headers: HeaderMap, request_id: RequestId, format: DocumentFormat) -> Response {
    let tools = state.gateway.registry().list();
    let document = project(&tools, &host_of(&state, &headers), &state.metadata);
    match render_document(&document, format) {
        Ok(text) => {
            ([(CONTENT_TYPE, HeaderValue::from_static(format.content_type()))], text).into_response()
        }
        Err(e) => ServerError::Internal(e.to_string()).to_http_response(request_id.as_str()),
    }
}

/// GET /openapi.json
pub async fn openapi_json(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
) -> Response {
    openapi(state, headers, request_id, DocumentFormat::Json).await
}

/// GET /openapi.yaml
pub async fn openapi_yaml(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
) -> Response {
    openapi(state, headers, request_id, DocumentFormat::Yaml).await
}

/// GET /.well-known/ai-plugin.json
pub async fn ai_plugin(State(state): State<AppState>, headers: HeaderMap) -> Json<PluginManifest> {
    Json(plugin_manifest(&host_of(&state, &headers), &state.metadata))
}
