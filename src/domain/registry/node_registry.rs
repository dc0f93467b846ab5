use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::fmt;

lazy_static! {
    static ref STANDARD_REGISTRY: NodeRegistry = NodeRegistry::standard();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
    Trigger,
    Action,
    Processing,
    Logic,
    Crm,
    Communication,
    Data,
    Flow,
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Trigger => "trigger",
            Self::Action => "action",
            Self::Processing => "processing",
            Self::Logic => "logic",
            Self::Crm => "crm",
            Self::Communication => "communication",
            Self::Data => "data",
            Self::Flow => "flow",
        };
        f.write_str(label)
    }
}

/// Registry entry describing one node kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    pub kind: String,
    pub type_id: String,
    pub category: NodeCategory,
    pub description: String,
    pub default_parameters: Map<String, Value>,
}

impl NodeSpec {
    fn new(kind: &str, type_id: &str, category: NodeCategory, description: &str, default_parameters: Value) -> Self {
        let default_parameters = match default_parameters {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        NodeSpec { kind: kind.to_string(), type_id: type_id.to_string(), category, description: description.to_string(), default_parameters }
    }
}

/// Read-only catalog of node kinds, keyed by short kind name.
///
/// Kinds keep their registration order, which is the order they are listed in generation prompts.
#[derive(Debug, Clone)]
pub struct NodeRegistry {
    specs: Vec<NodeSpec>,
    index: HashMap<String, usize>,
}

impl NodeRegistry {
    pub fn from_specs(specs: Vec<NodeSpec>) -> Self {
        let index = specs.iter().enumerate().map(|(position, spec)| (spec.kind.clone(), position)).collect();
        NodeRegistry { specs, index }
    }

    /// The process-wide catalog, built on first use.
    pub fn global() -> &'static NodeRegistry {
        &STANDARD_REGISTRY
    }

    /// Builds the catalog of node kinds the execution platform ships with.
    pub fn standard() -> Self {
        use NodeCategory::*;

        Self::from_specs(vec![
            NodeSpec::new("webhook", "n8n-nodes-base.webhook", Trigger, "Receives HTTP requests", json!({ "httpMethod": "POST", "responseMode": "onReceived" })),
            NodeSpec::new("manual_trigger", "n8n-nodes-base.manualTrigger", Trigger, "Manual workflow trigger", json!({})),
            NodeSpec::new(
                "schedule",
                "n8n-nodes-base.scheduleTrigger",
                Trigger,
                "Time-based workflow trigger",
                json!({ "rule": { "interval": [{ "field": "hours", "value": 1 }] } }),
            ),
            NodeSpec::new("email_send", "n8n-nodes-base.emailSend", Action, "Send email notifications", json!({ "fromEmail": "noreply@company.com" })),
            NodeSpec::new("email", "n8n-nodes-base.emailSend", Action, "Send email notifications", json!({ "fromEmail": "noreply@company.com" })),
            NodeSpec::new("http_request", "n8n-nodes-base.httpRequest", Action, "Make HTTP API calls", json!({ "method": "POST", "sendHeaders": true })),
            NodeSpec::new("function", "n8n-nodes-base.function", Processing, "Execute custom JavaScript code", json!({})),
            NodeSpec::new("code", "n8n-nodes-base.code", Processing, "Execute JavaScript with full access", json!({ "language": "javascript" })),
            NodeSpec::new("set", "n8n-nodes-base.set", Processing, "Set or modify data", json!({ "options": {} })),
            NodeSpec::new("if", "n8n-nodes-base.if", Logic, "Conditional branching", json!({})),
            NodeSpec::new("switch", "n8n-nodes-base.switch", Logic, "Multi-path routing", json!({ "fallbackOutput": 1 })),
            NodeSpec::new("merge", "n8n-nodes-base.merge", Logic, "Merge multiple data streams", json!({ "mode": "append" })),
            NodeSpec::new("crm", "n8n-nodes-base.hubspot", Crm, "Create or update a CRM record", json!({ "resource": "contact", "operation": "create" })),
            NodeSpec::new("hubspot", "n8n-nodes-base.hubspot", Crm, "HubSpot CRM integration", json!({ "resource": "contact", "operation": "create" })),
            NodeSpec::new("salesforce", "n8n-nodes-base.salesforce", Crm, "Salesforce CRM integration", json!({ "resource": "lead", "operation": "create" })),
            NodeSpec::new("slack", "n8n-nodes-base.slack", Communication, "Slack messaging", json!({ "resource": "message", "operation": "post" })),
            NodeSpec::new(
                "google_sheets",
                "n8n-nodes-base.googleSheets",
                Data,
                "Google Sheets integration",
                json!({ "resource": "spreadsheet", "operation": "append" }),
            ),
            NodeSpec::new("wait", "n8n-nodes-base.wait", Flow, "Wait for specified time", json!({ "unit": "seconds", "amount": 5 })),
        ])
    }

    pub fn lookup(&self, kind: &str) -> Option<&NodeSpec> {
        self.index.get(kind).map(|position| &self.specs[*position])
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.index.contains_key(kind)
    }

    /// All registered kind keys, in registration order.
    pub fn all_kinds(&self) -> Vec<&str> {
        self.specs.iter().map(|spec| spec.kind.as_str()).collect()
    }

    pub fn specs(&self) -> &[NodeSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_and_unknown_kinds() {
        let registry = NodeRegistry::global();

        let webhook = registry.lookup("webhook").unwrap();
        assert_eq!(webhook.type_id, "n8n-nodes-base.webhook");
        assert_eq!(webhook.category, NodeCategory::Trigger);
        assert_eq!(webhook.default_parameters.get("httpMethod"), Some(&json!("POST")));

        assert!(registry.lookup("teleport").is_none());
        assert!(!registry.contains("teleport"));
    }

    #[test]
    fn test_all_kinds_keeps_registration_order() {
        let registry = NodeRegistry::standard();
        let kinds = registry.all_kinds();

        assert_eq!(kinds.len(), 18);
        assert_eq!(kinds.first(), Some(&"webhook"));
        assert_eq!(kinds.last(), Some(&"wait"));
        assert_eq!(registry.len(), kinds.len());
    }

    #[test]
    fn test_kinds_without_defaults_have_empty_parameters() {
        let registry = NodeRegistry::standard();
        assert!(registry.lookup("function").unwrap().default_parameters.is_empty());
        assert_eq!(registry.lookup("email").unwrap().type_id, registry.lookup("email_send").unwrap().type_id);
        assert_eq!(registry.lookup("crm").unwrap().category.to_string(), "crm");
    }
}
