use crate::domain::registry::node_registry::NodeRegistry;
use crate::domain::workflow::workflow::current_timestamp;

pub const PROMPT_TEMPERATURE: f64 = 0.3;
pub const PROMPT_MAX_TOKENS: u32 = 6000;

const SYSTEM_PROMPT: &str = "You are an expert n8n workflow architect. You create functional, realistic automation workflows.

RULES:
1. Always include proper node IDs and connections
2. Use realistic parameters for each node type
3. Create workflows that solve real business problems
4. Include error handling where appropriate
5. Make workflows that are actually deployable
6. Return only valid JSON - no markdown, no explanations";

const WORKED_EXAMPLES: &str = "EXAMPLES OF GOOD WORKFLOWS:
- Lead Processing: webhook -> function(scoring) -> switch(route) -> crm(create) -> email(notify)
- Content Approval: webhook -> function(validate) -> slack(notify) -> wait -> switch(approved) -> http_request(publish)
- Data Sync: schedule -> http_request(fetch) -> function(transform) -> google_sheets(update) -> email(report)";

/// Instructions for the completion service: role and output rules.
pub fn system_prompt() -> &'static str {
    SYSTEM_PROMPT
}

/// Builds the user prompt from the registry catalog, the document schema and the worked examples.
pub fn user_prompt(registry: &NodeRegistry, description: &str) -> String {
    let node_types = registry
        .specs()
        .iter()
        .map(|spec| format!("- {}: {} - {}", spec.kind, spec.type_id, spec.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"
Generate a complete n8n workflow JSON for: "{description}"

REQUIREMENTS:
1. Create 4-8 interconnected nodes for a realistic workflow
2. Use appropriate n8n node types from the registry below
3. Include proper node connections and data flow
4. Add realistic parameters for each node
5. Position nodes 200px apart horizontally
6. Return ONLY valid JSON with no explanations

AVAILABLE NODE TYPES:
{node_types}

WORKFLOW STRUCTURE:
{structure}

{WORKED_EXAMPLES}

Generate the workflow now:
"#,
        structure = document_structure(),
    )
}

fn document_structure() -> String {
    format!(
        r#"{{
    "id": "unique-workflow-id",
    "name": "Workflow Name",
    "active": false,
    "nodes": [
        {{
            "id": "unique-node-id",
            "name": "Node Display Name",
            "type": "n8n-nodes-base.nodetype",
            "position": [x, y],
            "parameters": {{}},
            "typeVersion": 1
        }}
    ],
    "connections": {{
        "NodeName": {{
            "main": [[{{"node": "NextNodeName", "type": "main", "index": 0}}]]
        }}
    }},
    "settings": {{}},
    "staticData": {{}},
    "tags": [],
    "triggerCount": 1,
    "updatedAt": "{}",
    "versionId": "unique-version-id"
}}"#,
        current_timestamp()
    )
}
