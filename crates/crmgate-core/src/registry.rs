//! Static catalog of the tools exposed by the gateway

use crate::error::{GatewayError, GatewayResult};
use crate::types::{ToolDescriptor, NATURAL_QUERY_TOOL};
use indexmap::IndexMap;
use serde_json::json;

/// Upper bound accepted for `limit` arguments
pub const MAX_LIMIT: u64 = 500;

/// Registration-ordered tool catalog.
///
/// Built once at start-up and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, ToolDescriptor>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed CRM tool table
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for tool in builtin_tools() {
            // names in the builtin table are unique
            registry.tools.insert(tool.name.clone(), tool);
        }
        registry
    }

    pub fn register(&mut self, tool: ToolDescriptor) -> GatewayResult<()> {
        if self.tools.contains_key(&tool.name) {
            return Err(GatewayError::internal(format!("tool '{}' registered twice", tool.name)));
        }
        self.tools.insert(tool.name.clone(), tool);
        Ok(())
    }

    /// All descriptors in registration order
    pub fn list(&self) -> Vec<ToolDescriptor> {
        self.tools.values().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.values()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name)
    }

    /// Look up a tool by the dash-cased path segment used in REST routes
    pub fn get_by_dash_name(&self, dash_name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(&dash_name.replace('-', "_"))
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

fn builtin_tools() -> Vec<ToolDescriptor> {
    let fields_schema = json!({
        "type": "array",
        "items": {"type": "string"},
        "description": "Fields to include in each record"
    });
    let limit_schema = json!({
        "type": "integer",
        "minimum": 1,
        "maximum": MAX_LIMIT,
        "default": 50,
        "description": "Maximum number of records to return"
    });

    vec![
        ToolDescriptor::new(
            NATURAL_QUERY_TOOL,
            "Query CRM data using natural language. Ask about leads, contacts, deals and \
             other entities in plain English.",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Natural language query about CRM data (e.g. 'Show me leads created this week')"
                    },
                    "response_format": {
                        "type": "string",
                        "enum": ["table", "natural", "both"],
                        "default": "both",
                        "description": "Format for the response"
                    }
                },
                "required": ["query"]
            }),
        ),
        ToolDescriptor::new(
            "get_leads",
            "List CRM leads, most recent first.",
            json!({
                "type": "object",
                "properties": {
                    "limit": limit_schema.clone(),
                    "fields": fields_schema.clone()
                }
            }),
        ),
        ToolDescriptor::new(
            "get_contacts",
            "List CRM contacts, most recent first.",
            json!({
                "type": "object",
                "properties": {
                    "limit": limit_schema.clone(),
                    "fields": fields_schema.clone()
                }
            }),
        ),
        ToolDescriptor::new(
            "search_entities",
            "Search CRM records of one entity type using structured filters.",
            json!({
                "type": "object",
                "properties": {
                    "entity_type": {
                        "type": "string",
                        "description": "Entity type to search (e.g. lead, contact, deal)"
                    },
                    "filters": {
                        "type": "object",
                        "description": "Field/value pairs every returned record must match"
                    },
                    "fields": fields_schema,
                    "limit": limit_schema
                },
                "required": ["entity_type"]
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_order_is_stable() {
        let registry = ToolRegistry::builtin();
        assert_eq!(
            registry.names(),
            vec!["natural_query", "get_leads", "get_contacts", "search_entities"]
        );
        let again: Vec<String> = registry.list().into_iter().map(|t| t.name).collect();
        assert_eq!(again, registry.names());
    }

    #[test]
    fn lookup_by_dash_name() {
        let registry = ToolRegistry::builtin();
        assert_eq!(registry.get_by_dash_name("get-leads").map(|t| t.name.as_str()), Some("get_leads"));
        assert!(registry.get_by_dash_name("get-invoices").is_none());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = ToolRegistry::new();
        let tool = ToolDescriptor::new("ping", "ping", json!({"type": "object"}));
        registry.register(tool.clone()).unwrap();
        assert!(registry.register(tool).is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn every_builtin_schema_is_an_object_schema() {
        for tool in ToolRegistry::builtin().iter() {
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
            assert!(!tool.description.is_empty());
        }
    }
}
