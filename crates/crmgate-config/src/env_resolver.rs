//! `${VAR}` / `${VAR:default}` substitution inside config file values

use regex::Regex;
use serde_json::Value as JsonValue;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvResolverError {
    #[error("Environment variable '{0}' not found and no default provided")]
    VarNotFound(String),
    #[error("Environment variable '{0}' is not allowed. Allowed prefixes: {1:?}")]
    VarNotAllowed(String, Vec<String>),
}

fn var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::([^}]*))?\}").expect("valid variable pattern")
    })
}

/// Resolves variable references against an environment lookup.
///
/// Only variables starting with one of `allowed_prefixes` may be referenced;
/// an empty prefix list allows everything.
#[derive(Debug, Clone)]
pub struct EnvResolver {
    allowed_prefixes: Vec<String>,
}

impl Default for EnvResolver {
    fn default() -> Self {
        Self { allowed_prefixes: vec!["CRMGATE_".to_string()] }
    }
}

impl EnvResolver {
    pub fn new(allowed_prefixes: Vec<String>) -> Self {
        Self { allowed_prefixes }
    }

    pub fn unrestricted() -> Self {
        Self { allowed_prefixes: vec![] }
    }

    /// Resolve against the process environment
    pub fn resolve(&self, value: &JsonValue) -> Result<JsonValue, EnvResolverError> {
        self.resolve_with(value, &|name| std::env::var(name).ok())
    }

    pub fn resolve_with(
        &self,
        value: &JsonValue,
        lookup: &dyn Fn(&str) -> Option<String>,
    ) -> Result<JsonValue, EnvResolverError> {
        match value {
            JsonValue::String(s) => self.resolve_string(s, lookup),
            JsonValue::Object(obj) => {
                let mut resolved = serde_json::Map::new();
                for (key, val) in obj {
                    resolved.insert(key.clone(), self.resolve_with(val, lookup)?);
                }
                Ok(JsonValue::Object(resolved))
            }
            JsonValue::Array(items) => items
                .iter()
                .map(|item| self.resolve_with(item, lookup))
                .collect::<Result<Vec<_>, _>>()
                .map(JsonValue::Array),
            other => Ok(other.clone()),
        }
    }

    fn resolve_string(
        &self,
        input: &str,
        lookup: &dyn Fn(&str) -> Option<String>,
    ) -> Result<JsonValue, EnvResolverError> {
        if !input.contains("${") {
            return Ok(JsonValue::String(input.to_string()));
        }

        // Single pass: substituted values are not scanned again.
        let mut result = String::with_capacity(input.len());
        let mut last = 0;
        for caps in var_pattern().captures_iter(input) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            self.check_allowed(name.as_str())?;
            let value = match lookup(name.as_str()) {
                Some(v) => v,
                None => match caps.get(2) {
                    Some(default) => default.as_str().to_string(),
                    None => return Err(EnvResolverError::VarNotFound(name.as_str().to_string())),
                },
            };
            result.push_str(&input[last..whole.start()]);
            result.push_str(&value);
            last = whole.end();
        }
        result.push_str(&input[last..]);

        Ok(coerce_scalar(result))
    }

    fn check_allowed(&self, name: &str) -> Result<(), EnvResolverError> {
        if self.allowed_prefixes.is_empty()
            || self.allowed_prefixes.iter().any(|p| name.starts_with(p.as_str()))
        {
            Ok(())
        } else {
            Err(EnvResolverError::VarNotAllowed(name.to_string(), self.allowed_prefixes.clone()))
        }
    }
}

/// Substituted text becomes a bool or integer when it reads as one, so
/// `port: ${CRMGATE_PORT:8080}` still deserializes into a number.
fn coerce_scalar(text: String) -> JsonValue {
    if let Ok(b) = text.parse::<bool>() {
        JsonValue::Bool(b)
    } else if let Ok(n) = text.parse::<u64>() {
        JsonValue::from(n)
    } else if let Ok(n) = text.parse::<i64>() {
        JsonValue::from(n)
    } else {
        JsonValue::String(text)
    }
}
