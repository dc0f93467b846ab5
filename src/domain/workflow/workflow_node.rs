use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::utils::id::WorkflowNodeId;

/// A concrete automation step inside a workflow document.
///
/// `name` is the key edges use to address the node, so it must be unique within its document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowNode {
    pub id: WorkflowNodeId,
    pub name: String,

    /// Canonical type identifier, e.g. `n8n-nodes-base.webhook`.
    #[serde(rename = "type")]
    pub node_type: String,

    /// Editor coordinates `[x, y]`; cosmetic only.
    pub position: [i64; 2],

    #[serde(default)]
    pub parameters: Map<String, Value>,

    #[serde(default = "default_type_version")]
    pub type_version: u32,

    /// Credential references, present only for kinds that authenticate against an external system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Map<String, Value>>,
}

fn default_type_version() -> u32 {
    1
}

impl WorkflowNode {
    /// The type suffix after the last `.`, e.g. `webhook` for `n8n-nodes-base.webhook`.
    pub fn short_type(&self) -> &str {
        self.node_type.rsplit('.').next().unwrap_or(&self.node_type)
    }

    pub fn is_webhook(&self) -> bool {
        self.node_type.ends_with("webhook")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_optional_fields_take_defaults() {
        let node: WorkflowNode = serde_json::from_value(json!({
            "id": "n-1",
            "name": "Start",
            "type": "n8n-nodes-base.manualTrigger",
            "position": [240, 300]
        }))
        .unwrap();

        assert_eq!(node.type_version, 1);
        assert!(node.parameters.is_empty());
        assert!(node.credentials.is_none());
        assert_eq!(node.short_type(), "manualTrigger");
        assert!(!node.is_webhook());

        let encoded = serde_json::to_value(&node).unwrap();
        assert!(encoded.get("credentials").is_none());
        assert_eq!(encoded["typeVersion"], json!(1));
    }

    #[test]
    fn test_node_without_position_is_rejected() {
        let result = serde_json::from_value::<WorkflowNode>(json!({ "id": "n-1", "name": "Start", "type": "x" }));
        assert!(result.is_err());
    }
}
