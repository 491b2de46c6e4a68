use super::NodeId;

/// Issues unique, monotonically increasing node identifiers for one crawl
///
/// The allocator is not synchronized on its own. It lives inside the same
/// lock as the visited index so that issuing an identifier and recording it
/// against a URL are a single step.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: NodeId,
}

impl IdAllocator {
    /// Identifier handed out by the first call to [`IdAllocator::next_id`]
    pub const FIRST_ID: NodeId = 1;

    pub fn new() -> Self {
        Self::starting_at(Self::FIRST_ID)
    }

    pub fn starting_at(first: NodeId) -> Self {
        Self { next: first }
    }

    /// Returns a fresh identifier
    pub fn next_id(&mut self) -> NodeId {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
