use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::domain::workflow::workflow::WorkflowDocument;

pub const REQUIRED_DOCUMENT_FIELDS: [&str; 3] = ["name", "nodes", "connections"];
pub const REQUIRED_NODE_FIELDS: [&str; 4] = ["id", "name", "type", "position"];
pub const TRIGGER_TYPE_MARKERS: [&str; 3] = ["webhook", "manualTrigger", "scheduleTrigger"];

/// Diagnostics for one document. Only `errors` affect validity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub node_count: usize,
    pub connection_count: usize,
}

impl ValidationReport {
    fn fault(message: String) -> Self {
        ValidationReport { valid: false, errors: vec![message], ..Self::default() }
    }
}

/// Structural and referential checks on a workflow document.
///
/// Works on the raw JSON form so documents from any source (files, model output, other tools)
/// can be diagnosed, including ones that would not deserialize into a `WorkflowDocument`.
pub struct WorkflowValidator;

impl WorkflowValidator {
    pub fn validate(document: &Value) -> ValidationReport {
        match document.as_object() {
            Some(fields) => Self::validate_fields(fields),
            None => ValidationReport::fault(format!("Validation error: expected a JSON object, found {}", json_kind(document))),
        }
    }

    pub fn validate_document(document: &WorkflowDocument) -> ValidationReport {
        match serde_json::to_value(document) {
            Ok(value) => Self::validate(&value),
            Err(e) => ValidationReport::fault(format!("Validation error: {}", e)),
        }
    }

    fn validate_fields(document: &Map<String, Value>) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for field in REQUIRED_DOCUMENT_FIELDS {
            if !document.contains_key(field) {
                errors.push(format!("Missing required field: {}", field));
            }
        }

        let nodes: &[Value] = document.get("nodes").and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[]);
        if nodes.is_empty() {
            errors.push("Workflow must have at least one node".to_string());
        }

        let mut node_names: HashSet<&str> = HashSet::new();
        let mut has_trigger = false;

        for (index, node) in nodes.iter().enumerate() {
            for field in REQUIRED_NODE_FIELDS {
                if node.get(field).is_none() {
                    errors.push(format!("Node {} missing required field: {}", index, field));
                }
            }

            if let Some(name) = node.get("name").and_then(Value::as_str) {
                if !node_names.insert(name) {
                    errors.push(format!("Duplicate node name: {}", name));
                }
            }

            let node_type = node.get("type").and_then(Value::as_str).unwrap_or_default();
            if TRIGGER_TYPE_MARKERS.iter().any(|marker| node_type.contains(marker)) {
                has_trigger = true;
            }
        }

        if !has_trigger {
            warnings.push("Workflow should have at least one trigger node".to_string());
        }

        let connections = document.get("connections").and_then(Value::as_object);
        if let Some(connections) = connections {
            for (source, outputs) in connections {
                if !node_names.contains(source.as_str()) {
                    errors.push(format!("Connection references non-existent node: {}", source));
                }

                for target in connection_targets(outputs) {
                    if !node_names.contains(target) {
                        errors.push(format!("Connection references non-existent target: {}", target));
                    }
                }
            }
        }

        let report = ValidationReport {
            valid: errors.is_empty(),
            errors,
            warnings,
            node_count: nodes.len(),
            connection_count: connections.map(Map::len).unwrap_or(0),
        };

        log::debug!("Validation finished: valid={}, {} errors, {} warnings.", report.valid, report.errors.len(), report.warnings.len());
        report
    }
}

/// Target node names across every output group of one source entry.
fn connection_targets(outputs: &Value) -> impl Iterator<Item = &str> {
    outputs
        .get("main")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(|target| target.get("node").and_then(Value::as_str))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(name: &str, node_type: &str) -> Value {
        json!({ "id": format!("id-{}", name), "name": name, "type": node_type, "position": [240, 300] })
    }

    #[test]
    fn test_valid_chain() {
        let report = WorkflowValidator::validate(&json!({
            "name": "Ok",
            "nodes": [node("Hook", "n8n-nodes-base.webhook"), node("Mail", "n8n-nodes-base.emailSend")],
            "connections": { "Hook": { "main": [[{ "node": "Mail", "type": "main", "index": 0 }]] } }
        }));

        assert!(report.valid, "{:?}", report.errors);
        assert!(report.warnings.is_empty());
        assert_eq!(report.node_count, 2);
        assert_eq!(report.connection_count, 1);
    }

    #[test]
    fn test_missing_fields_are_each_reported() {
        let report = WorkflowValidator::validate(&json!({ "nodes": [{ "name": "Lonely" }] }));

        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec![
                "Missing required field: name",
                "Missing required field: connections",
                "Node 0 missing required field: id",
                "Node 0 missing required field: type",
                "Node 0 missing required field: position",
            ]
        );
        assert_eq!(report.warnings, vec!["Workflow should have at least one trigger node"]);
    }

    #[test]
    fn test_empty_nodes() {
        let report = WorkflowValidator::validate(&json!({ "name": "Empty", "nodes": [], "connections": {} }));
        assert_eq!(report.errors, vec!["Workflow must have at least one node"]);
        assert_eq!(report.node_count, 0);
    }

    #[test]
    fn test_trigger_absence_is_only_a_warning() {
        let report = WorkflowValidator::validate(&json!({
            "name": "Manual",
            "nodes": [node("Step", "n8n-nodes-base.function")],
            "connections": {}
        }));

        assert!(report.valid);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_dangling_source_and_target() {
        let report = WorkflowValidator::validate(&json!({
            "name": "Dangling",
            "nodes": [node("Hook", "n8n-nodes-base.scheduleTrigger")],
            "connections": {
                "Hook": { "main": [[{ "node": "Ghost", "type": "main", "index": 0 }]] },
                "Phantom": { "main": [[{ "node": "Hook", "type": "main", "index": 0 }]] }
            }
        }));

        assert!(!report.valid);
        assert!(report.errors.contains(&"Connection references non-existent target: Ghost".to_string()));
        assert!(report.errors.contains(&"Connection references non-existent node: Phantom".to_string()));
        assert_eq!(report.connection_count, 2);
    }

    #[test]
    fn test_non_object_is_single_fault() {
        let report = WorkflowValidator::validate(&json!([1, 2]));
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["Validation error: expected a JSON object, found an array"]);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let value = serde_json::to_value(ValidationReport::default()).unwrap();
        assert!(value.get("nodeCount").is_some());
        assert!(value.get("connectionCount").is_some());
    }
}
