//! REST API request and response bodies

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub response_format: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub query: String,
    pub result: String,
    pub response_format: String,
    pub timestamp: String,
    pub success: bool,
}

/// `POST /tools` body; older clients send `function_name`
#[derive(Debug, Default, Deserialize)]
pub struct ToolCallRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub function_name: Option<String>,
    #[serde(default)]
    pub arguments: Option<Map<String, Value>>,
}

impl ToolCallRequest {
    pub fn tool_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or(self.function_name.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Serialize)]
pub struct ToolResponse {
    pub result: String,
    pub tool_name: String,
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
    pub capabilities: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ToolsListResponse {
    pub tools: Vec<ToolSummary>,
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
pub struct DeploymentInfo {
    pub version: String,
    pub started_at: String,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub available_tools: Vec<String>,
    pub server_type: String,
    pub version: String,
    pub deployment_info: DeploymentInfo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_name_accepts_legacy_field() {
        let req: ToolCallRequest = serde_json::from_value(json!({"function_name": "get_leads"})).unwrap();
        assert_eq!(req.tool_name(), Some("get_leads"));

        let req: ToolCallRequest =
            serde_json::from_value(json!({"name": "get_contacts", "function_name": "get_leads"})).unwrap();
        assert_eq!(req.tool_name(), Some("get_contacts"));

        let req: ToolCallRequest = serde_json::from_value(json!({"name": "  "})).unwrap();
        assert_eq!(req.tool_name(), None);
    }
}
