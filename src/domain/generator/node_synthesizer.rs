use serde_json::{Map, Value, json};
use std::collections::HashSet;

use crate::domain::generator::pattern_selector::KeywordBuckets;
use crate::domain::registry::node_registry::NodeRegistry;
use crate::domain::utils::id::WorkflowNodeId;
use crate::domain::utils::text::{slug, truncate_chars};
use crate::domain::workflow::workflow_node::WorkflowNode;
use crate::error::{Error, Result};

pub const LANE_ORIGIN_X: i64 = 240;
pub const LANE_SPACING_X: i64 = 200;
pub const LANE_Y: i64 = 300;

/// Context-derived parameters a kind receives on top of its registry defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextParameters {
    WebhookPath,
    FunctionCode,
    EmailTemplate,
    HttpEndpoint,
    SlackMessage,
}

struct SynthesisRow {
    kind: &'static str,
    display_name: &'static str,
    context: Option<ContextParameters>,
}

static SYNTHESIS_TABLE: [SynthesisRow; 9] = [
    SynthesisRow { kind: "webhook", display_name: "Data Input", context: Some(ContextParameters::WebhookPath) },
    SynthesisRow { kind: "function", display_name: "Process Data", context: Some(ContextParameters::FunctionCode) },
    SynthesisRow { kind: "switch", display_name: "Route Decision", context: None },
    SynthesisRow { kind: "email", display_name: "Send Notification", context: Some(ContextParameters::EmailTemplate) },
    SynthesisRow { kind: "slack", display_name: "Slack Alert", context: Some(ContextParameters::SlackMessage) },
    SynthesisRow { kind: "http_request", display_name: "API Call", context: Some(ContextParameters::HttpEndpoint) },
    SynthesisRow { kind: "crm", display_name: "Update CRM", context: None },
    SynthesisRow { kind: "hubspot", display_name: "HubSpot CRM", context: None },
    SynthesisRow { kind: "salesforce", display_name: "Salesforce CRM", context: None },
];

/// Kinds that authenticate against an external system, with their placeholder credential reference.
static CREDENTIAL_TABLE: [(&str, &str, &str); 4] = [
    ("hubspot", "hubspotApi", "HubSpot account"),
    ("salesforce", "salesforceOAuth2Api", "Salesforce account"),
    ("slack", "slackApi", "Slack account"),
    ("email_send", "smtp", "SMTP account"),
];

/// Canned JavaScript bodies for function nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSnippet {
    Scoring,
    Validation,
    Enrichment,
}

impl CodeSnippet {
    pub fn select(keywords: &KeywordBuckets, description: &str) -> Self {
        if keywords.data.contains(&"score") || description.to_lowercase().contains("qualify") {
            Self::Scoring
        } else if keywords.data.contains(&"validate") {
            Self::Validation
        } else {
            Self::Enrichment
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            Self::Scoring => SCORING_SNIPPET,
            Self::Validation => VALIDATION_SNIPPET,
            Self::Enrichment => ENRICHMENT_SNIPPET,
        }
    }
}

const SCORING_SNIPPET: &str = r#"
// Scoring and qualification logic
const items = $input.all();

return items.map(item => {
  const data = item.json;
  let score = 0;

  if (data.email && data.email.includes('@')) score += 20;
  if (data.name && data.name.length > 2) score += 15;
  if (data.company) score += 25;
  if (data.phone) score += 10;

  return {
    ...data,
    score: score,
    qualified: score >= 50,
    processed_at: new Date().toISOString()
  };
});
"#;

const VALIDATION_SNIPPET: &str = r#"
// Data validation logic
const items = $input.all();

return items.map(item => {
  const data = item.json;
  const errors = [];

  if (!data.email || !data.email.includes('@')) errors.push('Invalid email');
  if (!data.name || data.name.length < 2) errors.push('Name required');

  return {
    ...data,
    valid: errors.length === 0,
    errors: errors,
    validated_at: new Date().toISOString()
  };
});
"#;

const ENRICHMENT_SNIPPET: &str = r#"
// Process and enrich data
const items = $input.all();

return items.map(item => ({
  ...item.json,
  processed: true,
  processed_at: new Date().toISOString(),
  workflow_id: $workflow.id
}));
"#;

/// Turns node kinds into concrete nodes for a single document.
///
/// One synthesizer instance must be used per document: it remembers the display names it has
/// handed out and suffixes repeats with the node's 1-based position.
pub struct NodeSynthesizer<'a> {
    registry: &'a NodeRegistry,
    used_names: HashSet<String>,
}

impl<'a> NodeSynthesizer<'a> {
    pub fn new(registry: &'a NodeRegistry) -> Self {
        NodeSynthesizer { registry, used_names: HashSet::new() }
    }

    pub fn synthesize(&mut self, kind: &str, index: usize, keywords: &KeywordBuckets, description: &str) -> Result<WorkflowNode> {
        let spec = self.registry.lookup(kind).ok_or_else(|| Error::UnknownNodeKind(kind.to_string()))?;
        let row = SYNTHESIS_TABLE.iter().find(|row| row.kind == kind);

        let base_name = row.map(|row| row.display_name.to_string()).unwrap_or_else(|| format!("Step {}", index + 1));
        let name = self.allocate_name(base_name, index);

        let mut parameters = spec.default_parameters.clone();
        if let Some(context) = row.and_then(|row| row.context) {
            parameters.extend(context_parameters(context, keywords, description));
        }

        Ok(WorkflowNode {
            id: WorkflowNodeId::generate(),
            name,
            node_type: spec.type_id.clone(),
            position: lane_position(index),
            parameters,
            type_version: 1,
            credentials: credentials_for(kind),
        })
    }

    fn allocate_name(&mut self, base_name: String, index: usize) -> String {
        let mut candidate = base_name.clone();
        let mut counter = index + 1;

        while self.used_names.contains(&candidate) {
            candidate = format!("{} {}", base_name, counter);
            counter += 1;
        }

        self.used_names.insert(candidate.clone());
        candidate
    }
}

/// Fixed horizontal lane: x = 240 + 200 * index, y = 300.
pub fn lane_position(index: usize) -> [i64; 2] {
    [LANE_ORIGIN_X + LANE_SPACING_X * index as i64, LANE_Y]
}

fn context_parameters(context: ContextParameters, keywords: &KeywordBuckets, description: &str) -> Map<String, Value> {
    let overrides = match context {
        ContextParameters::WebhookPath => json!({ "path": format!("/{}", slug(description, 20)) }),
        ContextParameters::FunctionCode => json!({ "functionCode": CodeSnippet::select(keywords, description).source() }),
        ContextParameters::EmailTemplate => json!({
            "toEmail": "admin@company.com",
            "subject": format!("Workflow: {}", truncate_chars(description, 30)),
            "message": format!("Workflow completed for: {}", description),
        }),
        ContextParameters::HttpEndpoint => json!({ "url": "https://api.example.com/webhook", "method": "POST" }),
        ContextParameters::SlackMessage => json!({
            "channel": "#notifications",
            "text": format!("Workflow alert: {}", truncate_chars(description, 50)),
        }),
    };

    match overrides {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn credentials_for(kind: &str) -> Option<Map<String, Value>> {
    CREDENTIAL_TABLE.iter().find(|(credential_kind, _, _)| *credential_kind == kind).map(|(_, credential_type, account)| {
        let mut credentials = Map::new();
        credentials.insert(credential_type.to_string(), json!({ "id": "1", "name": account }));
        credentials
    })
}
