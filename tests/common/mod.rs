#![allow(dead_code)]

use mockito::{Mock, Server};

use workflow_forge::domain::utils::id::WorkflowNodeId;
use workflow_forge::domain::workflow::workflow::WorkflowDocument;
use workflow_forge::domain::workflow::workflow_node::WorkflowNode;

/// Registers a mock answering `method path` with `status` and a JSON `body`.
pub fn json_mock(server: &mut Server, method: &str, path: &str, status: usize, body: &str) -> Mock {
    server.mock(method, path).with_status(status).with_header("content-type", "application/json").with_body(body)
}

pub fn node(name: &str, node_type: &str, x: i64) -> WorkflowNode {
    WorkflowNode {
        id: WorkflowNodeId::generate(),
        name: name.to_string(),
        node_type: node_type.to_string(),
        position: [x, 300],
        parameters: Default::default(),
        type_version: 1,
        credentials: None,
    }
}

pub fn descriptions() -> Vec<&'static str> {
    vec![
        "Process customer feedback and send notifications",
        "Managers approve expense reports",
        "Route qualified leads to HubSpot",
        "Validate orders and call the billing API",
        "Score inbound leads and post them to Slack",
        "Überprüfe Bestellungen täglich",
        "",
        "!!! ???",
        "Create a lead qualification workflow that scores leads based on company size, validates email addresses, routes high value leads to Salesforce and everything else to a nurture sequence",
    ]
}

pub fn node_types(document: &WorkflowDocument) -> Vec<&str> {
    document.nodes.iter().map(|node| node.node_type.as_str()).collect()
}
