//! Data model shared by the gateway and its front-ends

use crate::error::{GatewayError, GatewayResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Name of the natural-language query tool
pub const NATURAL_QUERY_TOOL: &str = "natural_query";

/// Caller-supplied tool arguments
pub type Arguments = Map<String, JsonValue>;

/// Static description of one tool exposed by the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: JsonValue,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: JsonValue,
    ) -> Self {
        Self { name: name.into(), description: description.into(), input_schema }
    }

    /// Path segment used for the per-tool REST endpoint (`get_leads` -> `get-leads`)
    pub fn dash_name(&self) -> String {
        self.name.replace('_', "-")
    }
}

/// Opaque bearer token for exactly one caller.
///
/// Forwarded verbatim to the backend; never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> GatewayResult<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(GatewayError::Unauthorized("Bearer token is empty".to_string()));
        }
        // must survive as an HTTP header value
        if trimmed.chars().any(char::is_control) {
            return Err(GatewayError::Unauthorized("Bearer token contains invalid characters".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Parse an `Authorization` header value (`Bearer <token>`)
    pub fn from_authorization_header(value: Option<&str>) -> GatewayResult<Self> {
        let value = value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| GatewayError::Unauthorized("Authorization header required".to_string()))?;

        let (scheme, token) = match value.split_once(' ') {
            Some((scheme, token)) => (scheme, token),
            None => (value, ""),
        };
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(GatewayError::Unauthorized(
                "Authorization header must use Bearer scheme".to_string(),
            ));
        }
        Self::new(token)
    }

    /// Raw token, for building the outbound `Authorization` header only
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Stable rate-limit key derived from the token
    pub fn identity(&self) -> CallerIdentity {
        let digest = Sha256::digest(self.0.as_bytes());
        CallerIdentity(hex::encode(digest))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***REDACTED***)")
    }
}

/// Hashed caller identity used to key rate-limit windows
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallerIdentity(String);

impl CallerIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix for log lines
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl From<&str> for CallerIdentity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for CallerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rendering hint for natural-language query results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    Table,
    Natural,
    #[default]
    Both,
}

impl ResponseFormat {
    pub const ALL: [ResponseFormat; 3] =
        [ResponseFormat::Table, ResponseFormat::Natural, ResponseFormat::Both];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Table => "table",
            ResponseFormat::Natural => "natural",
            ResponseFormat::Both => "both",
        }
    }

    /// Read `response_format` from tool arguments, defaulting to `both`
    pub fn from_arguments(arguments: &Arguments) -> GatewayResult<Self> {
        match arguments.get("response_format") {
            None | Some(JsonValue::Null) => Ok(Self::default()),
            Some(JsonValue::String(s)) => s.parse(),
            Some(_) => Err(GatewayError::invalid_argument(
                "response_format",
                "must be one of table, natural, both",
            )),
        }
    }
}

impl FromStr for ResponseFormat {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(ResponseFormat::Table),
            "natural" => Ok(ResponseFormat::Natural),
            "both" => Ok(ResponseFormat::Both),
            other => Err(GatewayError::invalid_argument(
                "response_format",
                format!("'{}' is not one of table, natural, both", other),
            )),
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded call, independent of the transport that received it
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    pub tool_name: String,
    pub arguments: Arguments,
    pub credential: Credential,
}

impl InvocationRequest {
    pub fn new(tool_name: impl Into<String>, arguments: Arguments, credential: Credential) -> Self {
        Self { tool_name: tool_name.into(), arguments, credential }
    }
}

/// Normalized outcome of a successful invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationResult {
    pub text: String,
    pub tool_name: String,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}
