use crate::render::{render_natural_query, render_tool_result};
use crmgate_client::{BackendFactory, HttpBackendFactory};
use crmgate_config::GatewayConfig;
use crmgate_core::sanitization::sanitize_map;
use crmgate_core::{
    validate_arguments, validate_query, Arguments, Credential, ErrorKind, GatewayError,
    GatewayResult, InvocationRequest, InvocationResult, RateLimiter, ResponseFormat, ToolRegistry,
    ValidationLimits, NATURAL_QUERY_TOOL,
};
use futures::FutureExt;
use serde_json::Value as JsonValue;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

/// What a resolved, validated call will do at the backend
#[derive(Debug, Clone, PartialEq)]
enum Dispatch {
    NaturalQuery { query: String, format: ResponseFormat },
    Tool { name: String },
}

/// Single entry point shared by every transport front-end.
///
/// Holds no per-caller state except the rate-limit windows; each call gets
/// its own backend bound to its own credential.
pub struct Gateway {
    registry: Arc<ToolRegistry>,
    limiter: Arc<RateLimiter>,
    backends: Arc<dyn BackendFactory>,
    limits: ValidationLimits,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("tools", &self.registry.names())
            .field("limiter", &self.limiter)
            .field("limits", &self.limits)
            .finish()
    }
}

impl Gateway {
    pub fn new(
        registry: Arc<ToolRegistry>,
        limiter: Arc<RateLimiter>,
        backends: Arc<dyn BackendFactory>,
        limits: ValidationLimits,
    ) -> Self {
        Self { registry, limiter, backends, limits }
    }

    /// Builtin tools, HTTPS backend and limits taken from `config`
    pub fn from_config(config: &GatewayConfig) -> GatewayResult<Self> {
        let backends = HttpBackendFactory::from_base_url(&config.api_base_url, config.request_timeout())
            .map_err(GatewayError::from)?;
        Ok(Self::new(
            Arc::new(ToolRegistry::builtin()),
            Arc::new(RateLimiter::new(config.rate_limit_config())),
            Arc::new(backends),
            config.validation_limits(),
        ))
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub async fn execute(&self, request: InvocationRequest) -> GatewayResult<InvocationResult> {
        self.invoke(&request.tool_name, request.arguments, request.credential).await
    }

    /// Run a natural-language query
    pub async fn query(
        &self,
        query: &str,
        format: ResponseFormat,
        credential: Credential,
    ) -> GatewayResult<InvocationResult> {
        let mut arguments = Arguments::new();
        arguments.insert("query".into(), JsonValue::String(query.to_string()));
        arguments.insert("response_format".into(), JsonValue::String(format.as_str().to_string()));
        self.invoke(NATURAL_QUERY_TOOL, arguments, credential).await
    }

    /// Resolve, validate, admit, dispatch and render one tool call.
    ///
    /// Every failure comes back as a typed [`GatewayError`]; nothing escapes
    /// as a panic.
    pub async fn invoke(
        &self,
        tool_name: &str,
        arguments: Arguments,
        credential: Credential,
    ) -> GatewayResult<InvocationResult> {
        let started = Instant::now();
        let identity = credential.identity();
        tracing::debug!(
            tool = %tool_name,
            identity = %identity.short(),
            arguments = %JsonValue::Object(sanitize_map(&arguments)),
            "invocation received"
        );

        let result = AssertUnwindSafe(self.run(tool_name, &arguments, credential))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(GatewayError::internal("invocation panicked")));

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => tracing::info!(
                tool = %tool_name,
                identity = %identity.short(),
                elapsed_ms,
                "invocation succeeded"
            ),
            Err(e) if e.kind() == ErrorKind::InternalError => tracing::error!(
                tool = %tool_name,
                identity = %identity.short(),
                elapsed_ms,
                error = %e,
                "invocation failed"
            ),
            Err(e) => tracing::warn!(
                tool = %tool_name,
                identity = %identity.short(),
                elapsed_ms,
                kind = %e.kind(),
                error = %e,
                "invocation rejected"
            ),
        }
        result
    }

    async fn run(
        &self,
        tool_name: &str,
        arguments: &Arguments,
        credential: Credential,
    ) -> GatewayResult<InvocationResult> {
        let dispatch = self.resolve(tool_name, arguments)?;

        self.limiter.check(&credential.identity()).into_result()?;

        let backend = self.backends.bind(credential)?;
        let (text, response_format) = match &dispatch {
            Dispatch::NaturalQuery { query, format } => {
                let body = backend.natural_query(query, *format).await?;
                (render_natural_query(&body, *format)?, Some(*format))
            }
            Dispatch::Tool { name } => {
                let body = backend.call_tool(name, arguments).await?;
                (render_tool_result(&body)?, None)
            }
        };

        Ok(InvocationResult { text, tool_name: tool_name.to_string(), succeeded: true, response_format })
    }

    fn resolve(&self, tool_name: &str, arguments: &Arguments) -> GatewayResult<Dispatch> {
        if tool_name.trim().is_empty() {
            return Err(GatewayError::invalid_argument("name", "tool name is required"));
        }

        if tool_name == NATURAL_QUERY_TOOL {
            if let Some(tool) = self.registry.get(NATURAL_QUERY_TOOL) {
                validate_arguments(tool, arguments, &self.limits)?;
            }
            let query = match arguments.get("query") {
                None | Some(JsonValue::Null) => {
                    return Err(GatewayError::invalid_argument("query", "is required"))
                }
                Some(JsonValue::String(q)) => q,
                Some(_) => return Err(GatewayError::invalid_argument("query", "must be a string")),
            };
            let query = validate_query(query, self.limits.max_query_length)?.to_string();
            let format = ResponseFormat::from_arguments(arguments)?;
            return Ok(Dispatch::NaturalQuery { query, format });
        }

        let tool = self
            .registry
            .get(tool_name)
            .ok_or_else(|| GatewayError::UnknownTool(tool_name.to_string()))?;
        validate_arguments(tool, arguments, &self.limits)?;
        Ok(Dispatch::Tool { name: tool.name.clone() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crmgate_core::RateLimitConfig;
    use serde_json::json;

    fn gateway() -> Gateway {
        let backends =
            HttpBackendFactory::from_base_url("https://crm.example.com", std::time::Duration::from_secs(1))
                .unwrap();
        Gateway::new(
            Arc::new(ToolRegistry::builtin()),
            Arc::new(RateLimiter::new(RateLimitConfig::default())),
            Arc::new(backends),
            ValidationLimits::default(),
        )
    }

    fn args(value: JsonValue) -> Arguments {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn resolves_natural_query_alias() {
        let dispatch = gateway()
            .resolve("natural_query", &args(json!({"query": "  leads today  ", "response_format": "table"})))
            .unwrap();
        assert_eq!(
            dispatch,
            Dispatch::NaturalQuery { query: "leads today".into(), format: ResponseFormat::Table }
        );

        let dispatch = gateway().resolve("natural_query", &args(json!({"query": "x"}))).unwrap();
        assert_eq!(dispatch, Dispatch::NaturalQuery { query: "x".into(), format: ResponseFormat::Both });
    }

    #[test]
    fn resolves_registered_tools_only() {
        let gw = gateway();
        assert_eq!(
            gw.resolve("get_leads", &Arguments::new()).unwrap(),
            Dispatch::Tool { name: "get_leads".into() }
        );
        assert_eq!(
            gw.resolve("get_invoices", &Arguments::new()).unwrap_err(),
            GatewayError::UnknownTool("get_invoices".into())
        );
        assert_eq!(gw.resolve(" ", &Arguments::new()).unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn natural_query_works_without_registry_entry() {
        let backends =
            HttpBackendFactory::from_base_url("https://crm.example.com", std::time::Duration::from_secs(1))
                .unwrap();
        let gw = Gateway::new(
            Arc::new(ToolRegistry::new()),
            Arc::new(RateLimiter::new(RateLimitConfig::default())),
            Arc::new(backends),
            ValidationLimits::default(),
        );
        assert!(gw.resolve("natural_query", &args(json!({"query": "x"}))).is_ok());
        assert_eq!(
            gw.resolve("natural_query", &args(json!({"query": 5}))).unwrap_err(),
            GatewayError::invalid_argument("query", "must be a string")
        );
    }
}
