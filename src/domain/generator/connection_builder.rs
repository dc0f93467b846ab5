use crate::domain::workflow::connection::ConnectionMap;
use crate::domain::workflow::workflow_node::WorkflowNode;

/// Wires nodes into a single linear chain in list order.
pub struct ConnectionBuilder;

impl ConnectionBuilder {
    /// Node `i` feeds node `i + 1` through its first output; the last node has no outgoing entry.
    pub fn chain(nodes: &[WorkflowNode]) -> ConnectionMap {
        let mut connections = ConnectionMap::new();

        for pair in nodes.windows(2) {
            connections.link(pair[0].name.as_str(), pair[1].name.as_str());
        }

        connections
    }
}
