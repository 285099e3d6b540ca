//! Per-call backend client bound to a single caller credential

use crate::backend::CrmBackend;
use crate::endpoint::{CrmEndpoint, NATURAL_QUERY_PATH, TOOL_DISPATCH_PATH};
use crate::error::{ClientError, ClientResult};
use crate::timeout::execute_with_timeout;
use async_trait::async_trait;
use crmgate_core::sanitization::scrub_secret;
use crmgate_core::{Arguments, Credential, ResponseFormat};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Longest backend error text carried into an error message
const MAX_ERROR_MESSAGE: usize = 300;

/// Issues backend requests under exactly one credential.
///
/// Constructed per invocation; the credential cannot be changed afterwards.
#[derive(Debug, Clone)]
pub struct CrmClient {
    http: Arc<Client>,
    endpoint: CrmEndpoint,
    credential: Credential,
}

impl CrmClient {
    pub fn new(http: Arc<Client>, endpoint: CrmEndpoint, credential: Credential) -> Self {
        Self { http, endpoint, credential }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn endpoint(&self) -> &CrmEndpoint {
        &self.endpoint
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<JsonValue> {
        let url = self.endpoint.url_for(path)?;
        let limit = self.endpoint.timeout();
        let started = Instant::now();

        let request = self
            .http
            .post(url.clone())
            .bearer_auth(self.credential.expose())
            .timeout(limit)
            .json(body);

        let (status, text) = execute_with_timeout(limit, async move {
            let response = request.send().await?;
            let status = response.status();
            let text = response.text().await?;
            Ok::<_, reqwest::Error>((status, text))
        })
        .await
        .map_err(|e| self.scrub(e))?;

        debug!(
            url = %url,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "backend responded"
        );

        if !status.is_success() {
            let message = scrub_secret(&error_message(status, &text), self.credential.expose());
            return Err(ClientError::from_status(status.as_u16(), message));
        }

        serde_json::from_str(&text).map_err(|e| {
            ClientError::MalformedResponse(format!("expected JSON from {}: {}", path, e))
        })
    }

    fn scrub(&self, err: ClientError) -> ClientError {
        match err {
            ClientError::Connection(msg) => {
                ClientError::Connection(scrub_secret(&msg, self.credential.expose()))
            }
            other => other,
        }
    }
}

#[async_trait]
impl CrmBackend for CrmClient {
    async fn natural_query(&self, query: &str, format: ResponseFormat) -> ClientResult<JsonValue> {
        let body = json!({ "query": query, "response_format": format.as_str() });
        self.post_json(NATURAL_QUERY_PATH, &body).await
    }

    async fn call_tool(&self, tool_name: &str, arguments: &Arguments) -> ClientResult<JsonValue> {
        let body = json!({ "tool_name": tool_name, "arguments": arguments });
        self.post_json(TOOL_DISPATCH_PATH, &body).await
    }
}

/// Best human-readable message from an error response body
fn error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<JsonValue>(body).ok().and_then(|v| {
        ["error", "message", "detail"].iter().find_map(|key| match v.get(*key) {
            Some(JsonValue::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(JsonValue::Object(inner)) => {
                inner.get("message").and_then(JsonValue::as_str).map(str::to_string)
            }
            _ => None,
        })
    });

    let message = from_json.unwrap_or_else(|| body.trim().to_string());
    if message.is_empty() {
        return status.canonical_reason().unwrap_or("no response body").to_string();
    }
    if message.chars().count() > MAX_ERROR_MESSAGE {
        let head: String = message.chars().take(MAX_ERROR_MESSAGE).collect();
        format!("{}...", head)
    } else {
        message
    }
}
