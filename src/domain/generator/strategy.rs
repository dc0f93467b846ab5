use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value, json};
use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::generator::connection_builder::ConnectionBuilder;
use crate::domain::generator::node_synthesizer::{NodeSynthesizer, lane_position};
use crate::domain::generator::pattern_selector::PatternSelector;
use crate::domain::generator::prompt::{PROMPT_MAX_TOKENS, PROMPT_TEMPERATURE, system_prompt, user_prompt};
use crate::domain::registry::node_registry::NodeRegistry;
use crate::domain::services::completion_service_trait::{CompletionRequest, CompletionService};
use crate::domain::utils::id::{WorkflowId, WorkflowNodeId};
use crate::domain::utils::text::truncate_chars;
use crate::domain::workflow::connection::ConnectionMap;
use crate::domain::workflow::workflow::{GenerationMeta, GeneratorKind, WorkflowDocument, default_settings, workflow_name};
use crate::domain::workflow::workflow_node::WorkflowNode;
use crate::error::{Error, Result};

lazy_static! {
    static ref CODE_FENCE: Regex = Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*(.*?)\s*```\s*$").expect("static regex is valid");
}

/// One way of producing a complete document from a description.
///
/// An `Err` means "try the next strategy"; it never reaches the caller of the generator.
pub trait GenerationStrategy: Send + Sync {
    fn kind(&self) -> GeneratorKind;

    fn produce(&self, description: &str) -> Result<WorkflowDocument>;
}

/// Tier 1: asks the completion service for a document and repairs what it returns.
pub struct ModelAssistedStrategy {
    service: Arc<dyn CompletionService>,
    registry: Arc<NodeRegistry>,
}

impl ModelAssistedStrategy {
    pub fn new(service: Arc<dyn CompletionService>, registry: Arc<NodeRegistry>) -> Self {
        ModelAssistedStrategy { service, registry }
    }

    fn request(&self, description: &str) -> CompletionRequest {
        CompletionRequest {
            system: system_prompt().to_string(),
            prompt: user_prompt(&self.registry, description),
            temperature: PROMPT_TEMPERATURE,
            max_tokens: PROMPT_MAX_TOKENS,
        }
    }
}

impl GenerationStrategy for ModelAssistedStrategy {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::ModelAssisted
    }

    fn produce(&self, description: &str) -> Result<WorkflowDocument> {
        let response = self.service.complete(&self.request(description))?;
        let raw = parse_model_response(&response)?;
        let enhanced = enhance_model_document(raw, description)?;

        let document: WorkflowDocument = serde_json::from_value(enhanced).map_err(|e| Error::ModelResponseError(e.to_string()))?;
        ensure_usable(&document)?;
        Ok(document)
    }
}

/// Rejects model documents without nodes or a name, or whose connections leave the node set.
fn ensure_usable(document: &WorkflowDocument) -> Result<()> {
    if document.nodes.is_empty() {
        return Err(Error::ModelResponseError("document has no nodes".to_string()));
    }
    if document.name.trim().is_empty() {
        return Err(Error::ModelResponseError("document has no name".to_string()));
    }

    let names: HashSet<&str> = document.node_names().into_iter().collect();
    if let Some(source) = document.connections.sources.keys().find(|source| !names.contains(source.as_str())) {
        return Err(Error::ModelResponseError(format!("connection source '{}' is not a node", source)));
    }
    if let Some((source, target)) = document.connections.edges().find(|(_, target)| !names.contains(target.node.as_str())) {
        return Err(Error::ModelResponseError(format!("connection '{}' -> '{}' targets no node", source, target.node)));
    }

    Ok(())
}

/// Removes an optional Markdown code fence and parses what is left as JSON.
pub fn parse_model_response(response: &str) -> Result<Value> {
    let body = match CODE_FENCE.captures(response).and_then(|captures| captures.get(1)) {
        Some(inner) => inner.as_str(),
        None => response.trim(),
    };

    serde_json::from_str(body).map_err(|e| Error::ModelResponseError(format!("response is not valid JSON: {}", e)))
}

/// Fills the fields a model tends to omit and attaches provenance.
pub fn enhance_model_document(raw: Value, description: &str) -> Result<Value> {
    let Value::Object(mut document) = raw else {
        return Err(Error::ModelResponseError("response is not a JSON object".to_string()));
    };

    document.entry("id").or_insert_with(|| json!(WorkflowId::generate()));
    document.entry("name").or_insert_with(|| json!(workflow_name(description)));
    document.entry("settings").or_insert_with(|| Value::Object(default_settings()));
    document.entry("staticData").or_insert_with(|| Value::Object(Map::new()));
    document.insert("active".to_string(), Value::Bool(false));

    let mut node_count = 0;
    if let Some(Value::Array(nodes)) = document.get_mut("nodes") {
        node_count = nodes.len();
        for node in nodes.iter_mut().filter_map(Value::as_object_mut) {
            node.entry("id").or_insert_with(|| json!(WorkflowNodeId::generate()));
            normalize_integers(node);
        }
    }

    let meta = GenerationMeta::new(description, node_count, GeneratorKind::ModelAssisted);
    document.insert("meta".to_string(), serde_json::to_value(meta)?);

    Ok(Value::Object(document))
}

// Models occasionally emit `typeVersion: 1.0` or fractional coordinates.
fn normalize_integers(node: &mut Map<String, Value>) {
    if let Some(version) = node.get("typeVersion").and_then(Value::as_f64) {
        node.insert("typeVersion".to_string(), json!(version.max(1.0).floor() as u32));
    }

    if let Some(Value::Array(position)) = node.get_mut("position") {
        for coordinate in position.iter_mut() {
            if let Some(number) = coordinate.as_f64() {
                *coordinate = json!(number.round() as i64);
            }
        }
    }
}

/// Tier 2: keyword pattern, synthesized nodes, linear chain.
pub struct PatternStrategy {
    registry: Arc<NodeRegistry>,
}

impl PatternStrategy {
    pub fn new(registry: Arc<NodeRegistry>) -> Self {
        PatternStrategy { registry }
    }
}

impl GenerationStrategy for PatternStrategy {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Pattern
    }

    fn produce(&self, description: &str) -> Result<WorkflowDocument> {
        let (keywords, pattern) = PatternSelector::select_for(description);
        let mut synthesizer = NodeSynthesizer::new(&self.registry);

        let nodes = pattern
            .kinds
            .iter()
            .enumerate()
            .map(|(index, kind)| synthesizer.synthesize(kind, index, &keywords, description))
            .collect::<Result<Vec<WorkflowNode>>>()?;

        let connections = ConnectionBuilder::chain(&nodes);
        log::info!("Pattern '{}' produced {} nodes and {} connections.", pattern.name, nodes.len(), connections.len());

        Ok(WorkflowDocument::assemble(workflow_name(description), nodes, connections).with_meta(description, GeneratorKind::Pattern))
    }
}

/// Tier 3: a fixed webhook -> function document. Cannot fail.
#[derive(Debug, Default, Clone, Copy)]
pub struct MinimalStrategy;

impl MinimalStrategy {
    pub fn fallback(&self, description: &str) -> WorkflowDocument {
        let start = WorkflowNode {
            id: WorkflowNodeId::generate(),
            name: "Start".to_string(),
            node_type: "n8n-nodes-base.webhook".to_string(),
            position: lane_position(0),
            parameters: object(json!({ "path": "/fallback-webhook", "httpMethod": "POST" })),
            type_version: 1,
            credentials: None,
        };

        let process = WorkflowNode {
            id: WorkflowNodeId::generate(),
            name: "Process".to_string(),
            node_type: "n8n-nodes-base.function".to_string(),
            position: [460, 300],
            parameters: object(json!({ "functionCode": fallback_code(description) })),
            type_version: 1,
            credentials: None,
        };

        let mut connections = ConnectionMap::new();
        connections.link(start.name.as_str(), process.name.as_str());

        WorkflowDocument::assemble(format!("Fallback - {}", truncate_chars(description, 30)), vec![start, process], connections)
            .with_tags(&["fallback"])
            .with_meta(description, GeneratorKind::Minimal)
    }
}

impl GenerationStrategy for MinimalStrategy {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Minimal
    }

    fn produce(&self, description: &str) -> Result<WorkflowDocument> {
        Ok(self.fallback(description))
    }
}

fn fallback_code(description: &str) -> String {
    // A JSON string literal is also a valid JavaScript string literal.
    let literal = Value::String(description.to_string()).to_string();
    let comment = description.replace(['\r', '\n'], " ");

    format!(
        r#"
// Fallback processing for: {comment}
const items = $input.all();
return items.map(item => ({{
  ...item.json,
  processed: true,
  description: {literal},
  fallback: true,
  timestamp: new Date().toISOString()
}}));
"#
    )
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedCompletion(String);

    impl CompletionService for CannedCompletion {
        fn complete(&self, _request: &CompletionRequest) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    fn model_strategy(response: &str) -> ModelAssistedStrategy {
        ModelAssistedStrategy::new(Arc::new(CannedCompletion(response.to_string())), Arc::new(NodeRegistry::standard()))
    }

    #[test]
    fn test_parse_strips_fences() {
        let fenced = "```json\n{\"name\": \"A\"}\n```";
        assert_eq!(parse_model_response(fenced).unwrap(), json!({ "name": "A" }));

        let bare_fence = "  ```\n{\"name\": \"B\"}```  ";
        assert_eq!(parse_model_response(bare_fence).unwrap(), json!({ "name": "B" }));

        assert_eq!(parse_model_response("{\"name\": \"C\"}").unwrap(), json!({ "name": "C" }));
        assert!(matches!(parse_model_response("Sure! Here it is"), Err(Error::ModelResponseError(_))));
    }

    #[test]
    fn test_model_document_is_enhanced() {
        let response = r#"```json
{
  "nodes": [
    { "name": "Hook", "type": "n8n-nodes-base.webhook", "position": [240.0, 300], "typeVersion": 1.0 },
    { "id": "given", "name": "Mail", "type": "n8n-nodes-base.emailSend", "position": [440, 300] }
  ],
  "connections": { "Hook": { "main": [[{ "node": "Mail", "type": "main", "index": 0 }]] } },
  "active": true
}
```"#;

        let document = model_strategy(response).produce("notify the sales team").unwrap();

        assert_eq!(document.name, "Notify The Sales Team Workflow");
        assert!(!document.active);
        assert_eq!(document.settings, default_settings());
        assert_eq!(document.nodes[0].position, [240, 300]);
        assert!(!document.nodes[0].id.as_str().is_empty());
        assert_eq!(document.nodes[1].id.as_str(), "given");
        assert_eq!(document.generator(), Some(GeneratorKind::ModelAssisted));
        assert_eq!(document.meta.as_ref().unwrap().node_count, 2);
    }

    #[test]
    fn test_model_document_without_nodes_is_rejected() {
        let result = model_strategy(r#"{"name": "Empty"}"#).produce("anything");
        assert!(matches!(result, Err(Error::ModelResponseError(_))));

        let result = model_strategy("[1, 2, 3]").produce("anything");
        assert!(matches!(result, Err(Error::ModelResponseError(_))));
    }

    #[test]
    fn test_model_document_without_content_is_rejected() {
        for response in [r#"{"name": "", "nodes": [], "connections": {}}"#, r#"{"name": "Empty", "nodes": [], "connections": {}}"#] {
            let result = model_strategy(response).produce("anything");
            assert!(matches!(result, Err(Error::ModelResponseError(_))), "{}", response);
        }

        let unnamed = r#"{"name": "  ", "nodes": [{ "name": "Hook", "type": "n8n-nodes-base.webhook", "position": [240, 300] }], "connections": {}}"#;
        assert!(matches!(model_strategy(unnamed).produce("anything"), Err(Error::ModelResponseError(_))));
    }

    #[test]
    fn test_model_document_with_dangling_connections_is_rejected() {
        let dangling_target = r#"{
            "name": "Haunted",
            "nodes": [{ "name": "Hook", "type": "n8n-nodes-base.webhook", "position": [240, 300] }],
            "connections": { "Hook": { "main": [[{ "node": "Ghost", "type": "main", "index": 0 }]] } }
        }"#;
        match model_strategy(dangling_target).produce("anything") {
            Err(Error::ModelResponseError(message)) => assert!(message.contains("Ghost"), "{}", message),
            other => panic!("unexpected result: {:?}", other),
        }

        let dangling_source = r#"{
            "name": "Haunted",
            "nodes": [{ "name": "Hook", "type": "n8n-nodes-base.webhook", "position": [240, 300] }],
            "connections": { "Phantom": { "main": [[{ "node": "Hook", "type": "main", "index": 0 }]] } }
        }"#;
        assert!(matches!(model_strategy(dangling_source).produce("anything"), Err(Error::ModelResponseError(_))));
    }

    #[test]
    fn test_pattern_strategy_builds_chain() {
        let document = PatternStrategy::new(Arc::new(NodeRegistry::standard())).produce("Managers approve vacation requests").unwrap();

        assert_eq!(document.nodes.len(), 6);
        assert_eq!(document.connections.edge_count(), 5);
        assert_eq!(document.generator(), Some(GeneratorKind::Pattern));
        assert_eq!(document.name, "Managers Approve Vacation Requests Workflow");
    }

    #[test]
    fn test_pattern_strategy_fails_on_incomplete_registry() {
        let result = PatternStrategy::new(Arc::new(NodeRegistry::from_specs(Vec::new()))).produce("anything");
        assert!(matches!(result, Err(Error::UnknownNodeKind(_))));
    }

    #[test]
    fn test_minimal_fallback_shape() {
        let document = MinimalStrategy.fallback("Handle the customer's 'urgent' tickets quickly please");

        assert_eq!(document.name, "Fallback - Handle the customer's 'urgent'");
        assert_eq!(document.tags, vec!["fallback"]);
        assert_eq!(document.node_names(), vec!["Start", "Process"]);
        assert_eq!(document.nodes[1].position, [460, 300]);
        assert_eq!(document.connections.get("Start").unwrap().main[0][0].node, "Process");
        assert_eq!(document.webhook_path(), Some("/fallback-webhook"));

        let code = document.nodes[1].parameters["functionCode"].as_str().unwrap();
        assert!(code.contains(r#"description: "Handle the customer's 'urgent' tickets quickly please""#));
    }
}
