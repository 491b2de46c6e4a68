use super::NodeId;
use std::collections::HashMap;

/// Mapping from canonical URL to the identifier it was assigned
///
/// This is the single source of truth for "have we seen this URL in this
/// crawl". An entry, once written, is never replaced.
#[derive(Debug, Clone, Default)]
pub struct VisitedIndex {
    ids: HashMap<String, NodeId>,
}

impl VisitedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identifier assigned to `url`, if any
    pub fn get(&self, url: &str) -> Option<NodeId> {
        self.ids.get(url).copied()
    }

    /// Records `id` for `url` unless the URL already has an identifier
    ///
    /// Returns the identifier in effect after the call.
    pub fn insert(&mut self, url: &str, id: NodeId) -> NodeId {
        *self.ids.entry(url.to_string()).or_insert(id)
    }
}
