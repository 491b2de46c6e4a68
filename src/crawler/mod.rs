//! Crawler module for web page fetching and graph construction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and seed reachability probing
//! - HTML parsing and link extraction
//! - The fetch engine and its frontier
//! - Redirect chain resolution
//! - Overall crawl coordination

mod coordinator;
mod engine;
mod fetcher;
mod parser;
mod redirect;

pub use coordinator::{run_crawl, Coordinator, CrawlResult, CrawlSession};
pub use engine::{CrawlEvents, EngineStats, FetchEngine, Frontier, SEED_DEPTH};
pub use fetcher::{build_http_client, fetch_url, probe_reachable, FetchResult};
pub use parser::{parse_html, ParsedPage};
pub use redirect::resolve_redirect_chain;
