//! OpenAPI 3.1 document derived from the tool registry

use crate::error::{OpenApiError, OpenApiResult};
use crate::host::HostContext;
use crate::metadata::ApiMetadata;
use crmgate_core::ToolDescriptor;
use serde_json::{json, Map, Value as JsonValue};
use std::str::FromStr;

pub const OPENAPI_VERSION: &str = "3.1.0";

const ERROR_REF: &str = "#/components/schemas/Error";
const TOOL_RESPONSE_REF: &str = "#/components/schemas/ToolResponse";
const QUERY_RESPONSE_REF: &str = "#/components/schemas/QueryResponse";

/// Serialization of a projected document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    #[default]
    Yaml,
    Json,
}

impl DocumentFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            DocumentFormat::Yaml => "application/x-yaml",
            DocumentFormat::Json => "application/json",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Yaml => "yaml",
            DocumentFormat::Json => "json",
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = OpenApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(DocumentFormat::Yaml),
            "json" => Ok(DocumentFormat::Json),
            other => Err(OpenApiError::UnsupportedFormat(other.to_string())),
        }
    }
}

pub fn render_document(document: &JsonValue, format: DocumentFormat) -> OpenApiResult<String> {
    Ok(match format {
        DocumentFormat::Yaml => serde_yaml::to_string(document)?,
        DocumentFormat::Json => serde_json::to_string_pretty(document)?,
    })
}

/// Project `tools` into an OpenAPI document served from `host`.
///
/// The three operational paths (`/health`, `/query`, `/tools`) are always
/// present; every tool adds `/tools/{dash-name}` with its input schema as the
/// request body.
pub fn project(tools: &[ToolDescriptor], host: &HostContext, meta: &ApiMetadata) -> JsonValue {
    let mut paths = Map::new();
    paths.insert("/health".into(), health_path());
    paths.insert("/query".into(), query_path(meta));
    paths.insert("/tools".into(), tools_path());
    for tool in tools {
        paths.insert(format!("/tools/{}", tool.dash_name()), tool_path(tool));
    }

    let server_description = if host.is_local() { "Local development server" } else { "Production server" };

    json!({
        "openapi": OPENAPI_VERSION,
        "info": {
            "title": meta.title,
            "description": meta.description,
            "version": meta.version,
            "contact": {
                "name": meta.contact_name,
                "email": meta.contact_email,
                "url": meta.contact_url
            },
            "license": {
                "name": "MIT",
                "url": "https://opensource.org/licenses/MIT"
            }
        },
        "servers": [
            { "url": host.base_url(), "description": server_description }
        ],
        "security": [ { "bearerAuth": [] } ],
        "components": components(),
        "paths": paths
    })
}

fn components() -> JsonValue {
    json!({
        "securitySchemes": {
            "bearerAuth": {
                "type": "http",
                "scheme": "bearer",
                "bearerFormat": "JWT",
                "description": "JWT token for API authentication"
            }
        },
        "schemas": {
            "Error": {
                "type": "object",
                "properties": {
                    "error": { "type": "string", "description": "Error message" }
                },
                "required": ["error"]
            },
            "ToolResponse": {
                "type": "object",
                "properties": {
                    "result": { "type": "string", "description": "Tool execution result" },
                    "tool_name": { "type": "string", "description": "Name of the executed tool" },
                    "success": { "type": "boolean", "description": "Whether the tool executed successfully" }
                },
                "required": ["result", "tool_name", "success"]
            },
            "QueryResponse": {
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Original query" },
                    "result": { "type": "string", "description": "Query result" },
                    "response_format": { "type": "string", "description": "Format of the response" },
                    "timestamp": { "type": "string", "format": "date-time", "description": "Query timestamp" },
                    "success": { "type": "boolean", "description": "Whether the query succeeded" }
                },
                "required": ["query", "result", "success"]
            }
        }
    })
}

fn json_content(schema: JsonValue) -> JsonValue {
    json!({ "application/json": { "schema": schema } })
}

fn ref_response(description: &str, reference: &str) -> JsonValue {
    json!({ "description": description, "content": json_content(json!({ "$ref": reference })) })
}

/// Success response plus the shared error responses
fn invocation_responses(ok_description: &str, ok_ref: &str) -> JsonValue {
    json!({
        "200": ref_response(ok_description, ok_ref),
        "400": ref_response("Bad request", ERROR_REF),
        "401": ref_response("Unauthorized", ERROR_REF),
        "413": ref_response("Request body too large", ERROR_REF),
        "429": ref_response("Rate limit exceeded", ERROR_REF),
        "500": ref_response("Internal server error", ERROR_REF),
        "502": ref_response("CRM backend returned an error", ERROR_REF),
        "504": ref_response("CRM backend unreachable or timed out", ERROR_REF)
    })
}

fn health_path() -> JsonValue {
    json!({
        "get": {
            "summary": "Health Check",
            "description": "Check API health and list available tools",
            "operationId": "health_check",
            "security": [],
            "responses": {
                "200": {
                    "description": "API is healthy",
                    "content": json_content(json!({
                        "type": "object",
                        "properties": {
                            "status": { "type": "string" },
                            "timestamp": { "type": "string", "format": "date-time" },
                            "available_tools": { "type": "array", "items": { "type": "string" } },
                            "server_type": { "type": "string" },
                            "version": { "type": "string" }
                        }
                    }))
                }
            }
        }
    })
}

fn query_path(meta: &ApiMetadata) -> JsonValue {
    json!({
        "post": {
            "summary": "Natural Language Query",
            "description": format!("Query {} data using natural language", meta.name_for_human),
            "operationId": "natural_language_query",
            "security": [ { "bearerAuth": [] } ],
            "requestBody": {
                "required": true,
                "content": json_content(json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Natural language query about CRM data",
                            "example": "Show me leads created this week"
                        },
                        "response_format": {
                            "type": "string",
                            "enum": ["table", "natural", "both"],
                            "default": "both",
                            "description": "Format for the response"
                        }
                    },
                    "required": ["query"]
                }))
            },
            "responses": invocation_responses("Query executed successfully", QUERY_RESPONSE_REF)
        }
    })
}

fn tools_path() -> JsonValue {
    json!({
        "get": {
            "summary": "List Available Tools",
            "description": "Get list of all available CRM tools",
            "operationId": "list_tools",
            "security": [ { "bearerAuth": [] } ],
            "responses": {
                "200": {
                    "description": "List of available tools",
                    "content": json_content(json!({
                        "type": "object",
                        "properties": {
                            "tools": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "name": { "type": "string" },
                                        "description": { "type": "string" },
                                        "parameters": { "type": "object" }
                                    }
                                }
                            },
                            "server_info": { "type": "object" }
                        }
                    }))
                },
                "401": ref_response("Unauthorized", ERROR_REF)
            }
        },
        "post": {
            "summary": "Execute Tool",
            "description": "Execute a specific CRM tool",
            "operationId": "execute_tool",
            "security": [ { "bearerAuth": [] } ],
            "requestBody": {
                "required": true,
                "content": json_content(json!({
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "description": "Name of the tool to execute" },
                        "arguments": { "type": "object", "description": "Arguments for the tool" }
                    },
                    "required": ["name"]
                }))
            },
            "responses": invocation_responses("Tool executed successfully", TOOL_RESPONSE_REF)
        }
    })
}

fn tool_path(tool: &ToolDescriptor) -> JsonValue {
    let schema = if tool.input_schema.is_object() {
        tool.input_schema.clone()
    } else {
        json!({ "type": "object" })
    };
    json!({
        "post": {
            "summary": format!("Execute {}", tool.name),
            "description": tool.description,
            "operationId": format!("execute_{}", tool.name),
            "security": [ { "bearerAuth": [] } ],
            "tags": ["CRM Tools"],
            "requestBody": {
                "required": true,
                "content": json_content(schema)
            },
            "responses": invocation_responses(&format!("{} executed successfully", tool.name), TOOL_RESPONSE_REF)
        }
    })
}
