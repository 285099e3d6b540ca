//! Stateless argument checks run before any backend call
//!
//! These checks only bound payload shape. Authorization and business rules
//! stay with the backend CRM API.

use crate::error::{GatewayError, GatewayResult};
use crate::types::{Arguments, ToolDescriptor};
use serde_json::Value as JsonValue;
use std::collections::HashSet;

/// Default maximum query length, in characters
pub const DEFAULT_MAX_QUERY_LENGTH: usize = 2000;

/// Limits applied by [`validate_arguments`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationLimits {
    pub max_query_length: usize,
    pub allowed_entity_types: Vec<String>,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_query_length: DEFAULT_MAX_QUERY_LENGTH,
            allowed_entity_types: ["lead", "contact", "deal", "account", "task", "note"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Check a natural-language query and return it trimmed
pub fn validate_query(text: &str, max_length: usize) -> GatewayResult<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::invalid_argument("query", "must not be empty"));
    }
    let length = trimmed.chars().count();
    if length > max_length {
        return Err(GatewayError::invalid_argument(
            "query",
            format!("is {} characters long, maximum is {}", length, max_length),
        ));
    }
    Ok(trimmed)
}

pub fn validate_entity_type<S: AsRef<str>>(entity_type: &str, allowed: &[S]) -> GatewayResult<()> {
    if allowed.iter().any(|a| a.as_ref() == entity_type) {
        return Ok(());
    }
    let allowed: Vec<&str> = allowed.iter().map(|a| a.as_ref()).collect();
    Err(GatewayError::invalid_argument(
        "entity_type",
        format!("'{}' is not one of: {}", entity_type, allowed.join(", ")),
    ))
}

/// Field names must be non-empty and unique; duplicates are rejected.
pub fn validate_fields<S: AsRef<str>>(fields: &[S]) -> GatewayResult<()> {
    let mut seen = HashSet::with_capacity(fields.len());
    for (index, field) in fields.iter().enumerate() {
        let field = field.as_ref();
        if field.trim().is_empty() {
            return Err(GatewayError::invalid_argument(
                "fields",
                format!("element {} is empty", index),
            ));
        }
        if !seen.insert(field) {
            return Err(GatewayError::invalid_argument(
                "fields",
                format!("duplicate field '{}'", field),
            ));
        }
    }
    Ok(())
}

/// Check arguments against a tool's input schema plus the field-specific rules.
///
/// Only the subset of JSON Schema the tool table uses is understood:
/// `required`, `type`, `enum`, `items.type`, `minimum` and `maximum`.
/// Properties not named in the schema pass through to the backend.
pub fn validate_arguments(
    tool: &ToolDescriptor,
    arguments: &Arguments,
    limits: &ValidationLimits,
) -> GatewayResult<()> {
    let schema = &tool.input_schema;

    if let Some(required) = schema.get("required").and_then(JsonValue::as_array) {
        for name in required.iter().filter_map(JsonValue::as_str) {
            match arguments.get(name) {
                None | Some(JsonValue::Null) => {
                    return Err(GatewayError::invalid_argument(name, "is required"));
                }
                _ => {}
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(JsonValue::as_object) {
        for (name, value) in arguments {
            if value.is_null() {
                continue;
            }
            if let Some(property) = properties.get(name) {
                check_property(name, value, property)?;
            }
        }
    }

    if let Some(query) = arguments.get("query").and_then(JsonValue::as_str) {
        validate_query(query, limits.max_query_length)?;
    }
    if let Some(entity_type) = arguments.get("entity_type").and_then(JsonValue::as_str) {
        validate_entity_type(entity_type, &limits.allowed_entity_types)?;
    }
    if let Some(fields) = arguments.get("fields").and_then(JsonValue::as_array) {
        let names = fields
            .iter()
            .map(|f| {
                f.as_str()
                    .ok_or_else(|| GatewayError::invalid_argument("fields", "must contain only strings"))
            })
            .collect::<GatewayResult<Vec<&str>>>()?;
        validate_fields(&names)?;
    }

    Ok(())
}

fn check_property(name: &str, value: &JsonValue, property: &JsonValue) -> GatewayResult<()> {
    if let Some(expected) = property.get("type").and_then(JsonValue::as_str) {
        if !matches_type(value, expected) {
            return Err(GatewayError::invalid_argument(name, format!("must be of type {}", expected)));
        }
        if expected == "array" {
            let item_type = property
                .get("items")
                .and_then(|items| items.get("type"))
                .and_then(JsonValue::as_str);
            if let (Some(item_type), Some(items)) = (item_type, value.as_array()) {
                if items.iter().any(|item| !matches_type(item, item_type)) {
                    return Err(GatewayError::invalid_argument(
                        name,
                        format!("must contain only {} values", item_type),
                    ));
                }
            }
        }
    }

    if let Some(allowed) = property.get("enum").and_then(JsonValue::as_array) {
        if !allowed.iter().any(|choice| enum_matches(choice, value)) {
            let choices: Vec<String> = allowed
                .iter()
                .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                .collect();
            return Err(GatewayError::invalid_argument(
                name,
                format!("must be one of: {}", choices.join(", ")),
            ));
        }
    }

    if let Some(number) = value.as_f64() {
        if let Some(min) = property.get("minimum").and_then(JsonValue::as_f64) {
            if number < min {
                return Err(GatewayError::invalid_argument(name, format!("must be at least {}", min)));
            }
        }
        if let Some(max) = property.get("maximum").and_then(JsonValue::as_f64) {
            if number > max {
                return Err(GatewayError::invalid_argument(name, format!("must be at most {}", max)));
            }
        }
    }

    Ok(())
}

fn matches_type(value: &JsonValue, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => true,
    }
}

/// String choices compare trimmed and case-insensitively, the same way
/// `ResponseFormat` parses them.
fn enum_matches(choice: &JsonValue, value: &JsonValue) -> bool {
    match (choice.as_str(), value.as_str()) {
        (Some(choice), Some(value)) => choice.eq_ignore_ascii_case(value.trim()),
        _ => choice == value,
    }
}
