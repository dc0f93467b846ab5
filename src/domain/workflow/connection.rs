use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The only edge kind the deterministic generator emits.
pub const MAIN_EDGE: &str = "main";

/// One edge end point: the target node (by display name), the edge kind and the target input index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionTarget {
    pub node: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub index: u32,
}

impl ConnectionTarget {
    pub fn main(node: impl Into<String>) -> Self {
        ConnectionTarget { node: node.into(), kind: MAIN_EDGE.to_string(), index: 0 }
    }
}

/// Outgoing edges of one source node.
///
/// `main` holds one group per output of the source; each group lists the targets fed by that output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConnections {
    #[serde(default)]
    pub main: Vec<Vec<ConnectionTarget>>,
}

/// Adjacency structure keyed by source node name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionMap {
    pub sources: BTreeMap<String, NodeConnections>,
}

impl ConnectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `target` as a new single-target output group of `source`.
    pub fn link(&mut self, source: impl Into<String>, target: impl Into<String>) {
        self.sources.entry(source.into()).or_default().main.push(vec![ConnectionTarget::main(target)]);
    }

    /// Number of source entries, which is what the deployment platform reports as connection count.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn get(&self, source: &str) -> Option<&NodeConnections> {
        self.sources.get(source)
    }

    /// Iterates every edge as `(source name, target)`.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &ConnectionTarget)> {
        self.sources
            .iter()
            .flat_map(|(source, connections)| connections.main.iter().flatten().map(move |target| (source.as_str(), target)))
    }

    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }
}
