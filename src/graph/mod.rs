//! Link graph data model and per-crawl accumulation
//!
//! This module contains the pieces that make up one crawl's graph:
//! - `IdAllocator`: issues node identifiers
//! - `VisitedIndex`: canonical URL to identifier mapping
//! - `GraphStore`: the ordered node and edge lists
//! - `LinkGraph`: the three of the above bundled so they can be guarded by a
//!   single lock

mod ids;
mod store;
mod visited;

pub use ids::IdAllocator;
pub use store::GraphStore;
pub use visited::VisitedIndex;

use serde::{Serialize, Serializer};

/// Identifier of a page within one crawl
pub type NodeId = u64;

/// A discovered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    #[serde(serialize_with = "id_as_string")]
    pub id: NodeId,

    /// Canonical URL of the page
    pub url: String,
}

/// A link from one page to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    #[serde(serialize_with = "id_as_string")]
    pub from_id: NodeId,

    #[serde(serialize_with = "id_as_string")]
    pub to_id: NodeId,
}

/// The result graph of a crawl
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    /// Returns the node registered under `id`
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Returns the node registered for a canonical URL
    pub fn node_by_url(&self, url: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.url == url)
    }

    /// Counts the edges from `from_id` to `to_id`
    pub fn edge_count_between(&self, from_id: NodeId, to_id: NodeId) -> usize {
        self.edges
            .iter()
            .filter(|edge| edge.from_id == from_id && edge.to_id == to_id)
            .count()
    }
}

/// Identifiers go over the wire as strings so consumers with narrow integer
/// types do not lose precision.
fn id_as_string<S: Serializer>(id: &NodeId, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(id)
}

/// Visited index, identifier allocator and graph store for one crawl
///
/// Every read-then-write sequence (look up a URL, allocate if unseen, append
/// nodes and edges) must run against one `&mut LinkGraph`, i.e. under one
/// lock acquisition, so that two concurrent observers of the same URL can
/// never both allocate an identifier for it.
#[derive(Debug, Default)]
pub struct LinkGraph {
    ids: IdAllocator,
    visited: VisitedIndex,
    store: GraphStore,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identifier of an already visited canonical URL
    pub fn lookup(&self, url: &str) -> Option<NodeId> {
        self.visited.get(url)
    }

    /// Returns the identifier for `url`, allocating one if the URL is unseen
    ///
    /// The boolean is `true` when a new identifier was allocated.
    pub fn lookup_or_allocate(&mut self, url: &str) -> (NodeId, bool) {
        if let Some(id) = self.visited.get(url) {
            return (id, false);
        }
        let id = self.ids.next_id();
        self.visited.insert(url, id);
        (id, true)
    }

    /// Registers a node (no-op if `id` is already registered)
    pub fn add_node(&mut self, id: NodeId, url: &str) -> bool {
        self.store.add_node(id, url)
    }

    /// Records a directed edge
    pub fn add_edge(&mut self, from_id: NodeId, to_id: NodeId) {
        self.store.add_edge(from_id, to_id);
    }

    pub fn snapshot(&self) -> Graph {
        self.store.snapshot()
    }
}
