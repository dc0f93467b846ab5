use chrono::{SecondsFormat, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::utils::id::{VersionId, WorkflowId};
use crate::domain::workflow::connection::ConnectionMap;
use crate::domain::workflow::workflow_node::WorkflowNode;

lazy_static! {
    static ref NON_NAME_CHARS: Regex = Regex::new(r"[^a-zA-Z0-9\s]").expect("static regex is valid");
}

/// Which generation tier produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    ModelAssisted,
    Pattern,
    Minimal,
}

impl GeneratorKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ModelAssisted => "model_assisted",
            Self::Pattern => "pattern",
            Self::Minimal => "minimal",
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Provenance: how, when and from which description a document was generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMeta {
    pub description: String,
    pub generated_at: String,
    pub node_count: usize,
    pub generator: GeneratorKind,
}

impl GenerationMeta {
    pub fn new(description: &str, node_count: usize, generator: GeneratorKind) -> Self {
        GenerationMeta { description: description.to_string(), generated_at: current_timestamp(), node_count, generator }
    }
}

/// A complete automation graph in the shape the execution server accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDocument {
    pub id: WorkflowId,
    pub name: String,

    /// Always `false` at generation time; activation happens on the server.
    #[serde(default)]
    pub active: bool,

    pub nodes: Vec<WorkflowNode>,

    #[serde(default)]
    pub connections: ConnectionMap,

    #[serde(default = "default_settings")]
    pub settings: Map<String, Value>,

    #[serde(default)]
    pub static_data: Map<String, Value>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default = "default_trigger_count")]
    pub trigger_count: u32,

    #[serde(default = "current_timestamp")]
    pub updated_at: String,

    #[serde(default = "VersionId::generate")]
    pub version_id: VersionId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<GenerationMeta>,
}

impl WorkflowDocument {
    /// Wraps generated nodes and edges into a fresh, inactive document with default execution settings.
    pub fn assemble(name: impl Into<String>, nodes: Vec<WorkflowNode>, connections: ConnectionMap) -> Self {
        WorkflowDocument {
            id: WorkflowId::generate(),
            name: name.into(),
            active: false,
            nodes,
            connections,
            settings: default_settings(),
            static_data: Map::new(),
            tags: Vec::new(),
            trigger_count: default_trigger_count(),
            updated_at: current_timestamp(),
            version_id: VersionId::generate(),
            meta: None,
        }
    }

    pub fn with_meta(mut self, description: &str, generator: GeneratorKind) -> Self {
        self.meta = Some(GenerationMeta::new(description, self.nodes.len(), generator));
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|tag| tag.to_string()).collect();
        self
    }

    pub fn node(&self, name: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|node| node.name == name)
    }

    pub fn node_names(&self) -> Vec<&str> {
        self.nodes.iter().map(|node| node.name.as_str()).collect()
    }

    pub fn generator(&self) -> Option<GeneratorKind> {
        self.meta.as_ref().map(|meta| meta.generator)
    }

    /// Path parameter of the first webhook node that declares one.
    pub fn webhook_path(&self) -> Option<&str> {
        self.nodes
            .iter()
            .filter(|node| node.is_webhook())
            .find_map(|node| node.parameters.get("path").and_then(Value::as_str).filter(|path| !path.is_empty()))
    }

    /// Human readable overview: name, per-type node counts, connection count and generation time.
    pub fn summary(&self) -> String {
        let mut type_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for node in &self.nodes {
            *type_counts.entry(node.short_type()).or_insert(0) += 1;
        }

        let type_summary = type_counts.iter().map(|(node_type, count)| format!("{} {}", count, node_type)).collect::<Vec<_>>().join(", ");
        let generated_at = self.meta.as_ref().map(|meta| meta.generated_at.as_str()).unwrap_or("unknown");

        format!(
            "Workflow: {}\nNodes: {} ({})\nConnections: {}\nGenerated at: {}",
            self.name,
            self.nodes.len(),
            type_summary,
            self.connections.len(),
            generated_at
        )
    }
}

/// Execution policy every generated document starts with.
pub fn default_settings() -> Map<String, Value> {
    let mut settings = Map::new();
    settings.insert("executionOrder".to_string(), json!("v1"));
    settings
}

fn default_trigger_count() -> u32 {
    1
}

/// RFC 3339 UTC timestamp with millisecond precision.
pub fn current_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Derives a document name from a free-text description.
///
/// Punctuation is dropped, the first four words are capitalised and joined, and " Workflow" is appended.
pub fn workflow_name(description: &str) -> String {
    let cleaned = NON_NAME_CHARS.replace_all(description, "");
    let words: Vec<String> = cleaned.split_whitespace().take(4).map(capitalize).collect();

    if words.is_empty() {
        return "Untitled Workflow".to_string();
    }

    format!("{} Workflow", words.join(" "))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::utils::id::WorkflowNodeId;

    fn node(name: &str, node_type: &str) -> WorkflowNode {
        WorkflowNode {
            id: WorkflowNodeId::generate(),
            name: name.to_string(),
            node_type: node_type.to_string(),
            position: [240, 300],
            parameters: Map::new(),
            type_version: 1,
            credentials: None,
        }
    }

    #[test]
    fn test_workflow_name_takes_first_four_words() {
        assert_eq!(workflow_name("Process customer feedback and send notifications"), "Process Customer Feedback And Workflow");
        assert_eq!(workflow_name("create a LEAD-qualification flow!"), "Create A Leadqualification Flow Workflow");
        assert_eq!(workflow_name("  ?!  "), "Untitled Workflow");
    }

    #[test]
    fn test_assemble_defaults() {
        let document = WorkflowDocument::assemble("Test Workflow", vec![node("Start", "n8n-nodes-base.webhook")], ConnectionMap::new());

        assert!(!document.active);
        assert_eq!(document.settings.get("executionOrder"), Some(&json!("v1")));
        assert!(document.static_data.is_empty());
        assert!(document.tags.is_empty());
        assert_eq!(document.trigger_count, 1);
        assert!(document.meta.is_none());
    }

    #[test]
    fn test_deserialize_fills_server_fields() {
        let document: WorkflowDocument = serde_json::from_value(json!({
            "id": "wf-1",
            "name": "Minimal",
            "nodes": []
        }))
        .unwrap();

        assert_eq!(document.settings, default_settings());
        assert_eq!(document.trigger_count, 1);
        assert!(!document.version_id.as_str().is_empty());
        assert!(!document.updated_at.is_empty());
    }

    #[test]
    fn test_summary_counts_types() {
        let mut connections = ConnectionMap::new();
        connections.link("Start", "Mail");
        let document = WorkflowDocument::assemble(
            "Summary Workflow",
            vec![node("Start", "n8n-nodes-base.webhook"), node("Mail", "n8n-nodes-base.emailSend")],
            connections,
        )
        .with_meta("summary", GeneratorKind::Pattern);

        let summary = document.summary();
        assert!(summary.contains("Workflow: Summary Workflow"));
        assert!(summary.contains("Nodes: 2 (1 emailSend, 1 webhook)"));
        assert!(summary.contains("Connections: 1"));
    }
}
