use super::{Edge, Graph, Node, NodeId};
use std::collections::HashSet;

/// Append-only accumulation of the nodes and edges found during one crawl
///
/// Nodes are kept in registration order and registering an identifier twice
/// is a no-op. Edges are kept exactly as reported, duplicates included.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    registered: HashSet<NodeId>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node
    ///
    /// Returns `true` if the node was added, `false` if `id` was already
    /// registered.
    pub fn add_node(&mut self, id: NodeId, url: &str) -> bool {
        if !self.registered.insert(id) {
            return false;
        }
        self.nodes.push(Node {
            id,
            url: url.to_string(),
        });
        true
    }

    /// Records a directed edge
    pub fn add_edge(&mut self, from_id: NodeId, to_id: NodeId) {
        self.edges.push(Edge { from_id, to_id });
    }

    /// Copies out the accumulated graph
    pub fn snapshot(&self) -> Graph {
        Graph {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }
}
