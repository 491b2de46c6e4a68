//! State module for tracking crawl progress
//!
//! `CrawlState` tracks where a single crawl request is in its lifecycle.

mod crawl_state;

pub use crawl_state::CrawlState;
