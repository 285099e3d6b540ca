//! Gateway configuration with documented defaults and environment overrides

use crate::error::{ConfigError, ConfigResult};
use crmgate_core::{RateLimitConfig, ValidationLimits};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

pub const ENV_API_BASE_URL: &str = "CRMGATE_API_BASE_URL";
pub const ENV_AUTH_TOKEN: &str = "CRMGATE_AUTH_TOKEN";
pub const ENV_HOST: &str = "CRMGATE_HOST";
pub const ENV_PORT: &str = "CRMGATE_PORT";
pub const ENV_RATE_LIMIT_REQUESTS: &str = "CRMGATE_RATE_LIMIT_REQUESTS";
pub const ENV_RATE_LIMIT_WINDOW_SECS: &str = "CRMGATE_RATE_LIMIT_WINDOW_SECS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "CRMGATE_REQUEST_TIMEOUT_SECS";
pub const ENV_MAX_REQUEST_BODY_BYTES: &str = "CRMGATE_MAX_REQUEST_BODY_BYTES";
pub const ENV_MAX_QUERY_LENGTH: &str = "CRMGATE_MAX_QUERY_LENGTH";
pub const ENV_ALLOWED_ENTITY_TYPES: &str = "CRMGATE_ALLOWED_ENTITY_TYPES";
pub const ENV_CORS_ORIGINS: &str = "CRMGATE_CORS_ORIGINS";

pub const DEFAULT_API_BASE_URL: &str = "https://goferapi.ambivo.com";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_RATE_LIMIT_REQUESTS: usize = 100;
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub max_requests: usize,
    pub window_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self { max_requests: DEFAULT_RATE_LIMIT_REQUESTS, window_secs: DEFAULT_RATE_LIMIT_WINDOW_SECS }
    }
}

/// Everything the gateway and its front-ends need, passed explicitly at construction
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    #[serde(deserialize_with = "lenient_string")]
    pub api_base_url: String,
    /// Fallback credential for single-caller transports (MCP stdio).
    /// REST callers always supply their own.
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing)]
    pub auth_token: Option<String>,
    pub host: String,
    pub port: u16,
    pub rate_limit: RateLimitSettings,
    pub request_timeout_secs: u64,
    pub max_request_body_bytes: usize,
    pub max_query_length: usize,
    pub allowed_entity_types: Vec<String>,
    pub cors_origins: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        let limits = ValidationLimits::default();
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_token: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            rate_limit: RateLimitSettings::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_request_body_bytes: DEFAULT_MAX_REQUEST_BODY_BYTES,
            max_query_length: limits.max_query_length,
            allowed_entity_types: limits.allowed_entity_types,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_base_url", &self.api_base_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "***REDACTED***"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("rate_limit", &self.rate_limit)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_request_body_bytes", &self.max_request_body_bytes)
            .field("max_query_length", &self.max_query_length)
            .field("allowed_entity_types", &self.allowed_entity_types)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

impl GatewayConfig {
    /// Defaults overridden by the process environment
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_env(lookup)?;
        Ok(config)
    }

    /// Overlay `CRMGATE_*` variables onto this config
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get(ENV_API_BASE_URL) {
            self.api_base_url = v;
        }
        if let Some(v) = get(ENV_AUTH_TOKEN) {
            self.auth_token = Some(v);
        }
        if let Some(v) = get(ENV_HOST) {
            self.host = v;
        }
        if let Some(v) = get(ENV_PORT) {
            self.port = parse_number(ENV_PORT, &v)?;
        }
        if let Some(v) = get(ENV_RATE_LIMIT_REQUESTS) {
            self.rate_limit.max_requests = parse_number(ENV_RATE_LIMIT_REQUESTS, &v)?;
        }
        if let Some(v) = get(ENV_RATE_LIMIT_WINDOW_SECS) {
            self.rate_limit.window_secs = parse_number(ENV_RATE_LIMIT_WINDOW_SECS, &v)?;
        }
        if let Some(v) = get(ENV_REQUEST_TIMEOUT_SECS) {
            self.request_timeout_secs = parse_number(ENV_REQUEST_TIMEOUT_SECS, &v)?;
        }
        if let Some(v) = get(ENV_MAX_REQUEST_BODY_BYTES) {
            self.max_request_body_bytes = parse_number(ENV_MAX_REQUEST_BODY_BYTES, &v)?;
        }
        if let Some(v) = get(ENV_MAX_QUERY_LENGTH) {
            self.max_query_length = parse_number(ENV_MAX_QUERY_LENGTH, &v)?;
        }
        if let Some(v) = get(ENV_ALLOWED_ENTITY_TYPES) {
            self.allowed_entity_types = split_list(&v);
        }
        if let Some(v) = get(ENV_CORS_ORIGINS) {
            self.cors_origins = split_list(&v);
        }
        Ok(())
    }

    /// Reject values the gateway cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        let url = url::Url::parse(&self.api_base_url).map_err(|e| ConfigError::InvalidValue {
            key: "api_base_url".into(),
            value: self.api_base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                key: "api_base_url".into(),
                value: self.api_base_url.clone(),
                reason: "scheme must be http or https".into(),
            });
        }
        if self.port == 0 {
            return Err(ConfigError::Validation("port must be greater than 0".into()));
        }
        if self.rate_limit.max_requests == 0 || self.rate_limit.window_secs == 0 {
            return Err(ConfigError::Validation(
                "rate limit requests and window must be greater than 0".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Validation("request timeout must be greater than 0".into()));
        }
        if self.max_request_body_bytes == 0 {
            return Err(ConfigError::Validation("max request body size must be greater than 0".into()));
        }
        if self.max_query_length == 0 {
            return Err(ConfigError::Validation("max query length must be greater than 0".into()));
        }
        if self.allowed_entity_types.is_empty() {
            return Err(ConfigError::Validation("allowed entity types must not be empty".into()));
        }
        Ok(())
    }

    /// Non-fatal problems worth logging at start-up
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.auth_token.is_none() {
            warnings.push(format!(
                "{} is not set; callers must supply a bearer token with every request",
                ENV_AUTH_TOKEN
            ));
        }
        if self.api_base_url.starts_with("http://") {
            warnings.push(format!(
                "backend API {} is plain HTTP; credentials will travel unencrypted",
                self.api_base_url
            ));
        }
        warnings
    }

    pub fn bind_addr(&self) -> String {
        let host = if self.host == "localhost" { "127.0.0.1" } else { self.host.as_str() };
        format!("{}:{}", host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn rate_limit_config(&self) -> RateLimitConfig {
        RateLimitConfig::new(self.rate_limit.max_requests, Duration::from_secs(self.rate_limit.window_secs))
    }

    pub fn validation_limits(&self) -> ValidationLimits {
        ValidationLimits {
            max_query_length: self.max_query_length,
            allowed_entity_types: self.allowed_entity_types.clone(),
        }
    }
}

fn parse_number<T>(key: &str, value: &str) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

// Substituted env values may arrive as numbers or booleans.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!("expected a string, found {}", other))),
    }
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) if s.trim().is_empty() => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!("expected a string, found {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_are_documented_values() {
        let config = GatewayConfig::default();
        assert_eq!(config.api_base_url, "https://goferapi.ambivo.com");
        assert_eq!(config.port, 8080);
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.rate_limit.window_secs, 60);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_request_body_bytes, 1_048_576);
        assert_eq!(config.max_query_length, 2000);
        assert_eq!(config.cors_origins, vec!["*"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_overrides_defaults() {
        let config = GatewayConfig::from_lookup(lookup(&[
            (ENV_API_BASE_URL, "https://crm.example.com/"),
            (ENV_PORT, "9000"),
            (ENV_RATE_LIMIT_REQUESTS, "5"),
            (ENV_ALLOWED_ENTITY_TYPES, "lead, contact ,"),
            (ENV_AUTH_TOKEN, "  "),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "https://crm.example.com/");
        assert_eq!(config.port, 9000);
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.allowed_entity_types, vec!["lead", "contact"]);
        assert_eq!(config.auth_token, None);
    }

    #[test]
    fn malformed_numbers_are_reported() {
        let err = GatewayConfig::from_lookup(lookup(&[(ENV_PORT, "eighty")])).unwrap_err();
        assert!(err.to_string().contains(ENV_PORT));
    }

    #[test]
    fn missing_token_is_a_warning_not_an_error() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.warnings().iter().any(|w| w.contains(ENV_AUTH_TOKEN)));

        let with_token = GatewayConfig { auth_token: Some("t".into()), ..GatewayConfig::default() };
        assert!(with_token.warnings().is_empty());
    }

    #[test]
    fn validation_rejects_bad_values() {
        let bad_url = GatewayConfig { api_base_url: "not a url".into(), ..Default::default() };
        assert!(bad_url.validate().is_err());

        let ftp = GatewayConfig { api_base_url: "ftp://crm.example.com".into(), ..Default::default() };
        assert!(ftp.validate().is_err());

        let mut zero_window = GatewayConfig::default();
        zero_window.rate_limit.window_secs = 0;
        assert!(zero_window.validate().is_err());
    }

    #[test]
    fn debug_output_hides_token() {
        let config = GatewayConfig { auth_token: Some("super-secret".into()), ..Default::default() };
        assert!(!format!("{:?}", config).contains("super-secret"));
    }

    #[test]
    fn bind_addr_maps_localhost() {
        assert_eq!(GatewayConfig::default().bind_addr(), "127.0.0.1:8080");
        let config = GatewayConfig { host: "0.0.0.0".into(), port: 3000, ..Default::default() };
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }
}
