//! Statistics over a finished crawl graph
//!
//! Logged when a crawl completes.

use crate::graph::{Edge, Graph};
use crate::url::extract_domain;
use std::collections::HashSet;
use std::fmt;
use url::Url;

/// Crawl statistics summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStatistics {
    /// Number of pages in the graph
    pub total_nodes: usize,

    /// Number of edges, duplicates included
    pub total_edges: usize,

    /// Number of distinct (from, to) pairs
    pub distinct_edges: usize,

    /// Number of distinct hosts among the pages
    pub unique_hosts: usize,
}

impl GraphStatistics {
    pub fn from_graph(graph: &Graph) -> Self {
        let distinct_edges = graph.edges.iter().collect::<HashSet<&Edge>>().len();

        let unique_hosts = graph
            .nodes
            .iter()
            .filter_map(|node| Url::parse(&node.url).ok())
            .filter_map(|url| extract_domain(&url))
            .collect::<HashSet<_>>()
            .len();

        Self {
            total_nodes: graph.nodes.len(),
            total_edges: graph.edges.len(),
            distinct_edges,
            unique_hosts,
        }
    }

    /// Number of edges that repeat an earlier (from, to) pair
    pub fn duplicate_edges(&self) -> usize {
        self.total_edges - self.distinct_edges
    }
}

impl fmt::Display for GraphStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pages across {} hosts, {} links ({} distinct)",
            self.total_nodes, self.unique_hosts, self.total_edges, self.distinct_edges
        )
    }
}
