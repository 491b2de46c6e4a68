/// Crawl state definitions for tracking the lifecycle of one crawl request
///
/// A crawl moves `Idle -> Seeding -> Running -> Draining -> Completed`. Seeding
/// and Running may instead end in `Failed`.
use std::fmt;

/// Represents the current state of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// Created, no seed received yet
    Idle,

    /// Normalizing and probing the seed
    Seeding,

    /// The fetch engine is working through the frontier
    Running,

    /// The engine is done; the graph is being snapshotted
    Draining,

    /// The result has been produced
    Completed,

    /// The seed was rejected or the engine could not dispatch it
    Failed,
}

impl CrawlState {
    /// Returns true while the crawl may still mutate its graph, and so may
    /// still fail
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Seeding | Self::Running)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Seeding)
                | (Self::Seeding, Self::Running)
                | (Self::Seeding, Self::Failed)
                | (Self::Running, Self::Draining)
                | (Self::Running, Self::Failed)
                | (Self::Draining, Self::Completed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Seeding => "seeding",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
