//! Crawler coordinator - main crawl orchestration logic
//!
//! This module wires the graph to the fetch engine for one crawl request:
//! - Normalizing and probing the seed
//! - Turning link and redirect events into graph mutations
//! - Deciding which discovered URLs are fetched next
//! - Enforcing the crawl's time budget

use crate::config::Config;
use crate::crawler::engine::{CrawlEvents, FetchEngine, Frontier};
use crate::crawler::fetcher::probe_reachable;
use crate::crawler::redirect::resolve_redirect_chain;
use crate::graph::{Graph, LinkGraph, NodeId};
use crate::output::GraphStatistics;
use crate::state::CrawlState;
use crate::url::normalize_url;
use crate::CrawlError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use url::Url;

/// Outcome of a successful crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlResult {
    pub graph: Graph,

    /// True when the time budget ran out before the frontier was exhausted
    pub partial: bool,
}

/// Graph and stop signal shared by every event of one crawl
///
/// This is the [`CrawlEvents`] implementation handed to the fetch engine.
#[derive(Debug, Default)]
pub struct CrawlSession {
    graph: Mutex<LinkGraph>,

    /// May be observed late: a handler that read `false` just before the
    /// flag was raised can still queue one more fetch.
    stop: AtomicBool,
}

impl CrawlSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the canonical seed URL as the first node
    pub fn seed(&self, canonical_url: &str) -> NodeId {
        let mut graph = self.graph();
        let (id, _) = graph.lookup_or_allocate(canonical_url);
        graph.add_node(id, canonical_url);
        id
    }

    /// Stops scheduling new fetches; in-flight work is left alone
    pub fn raise_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Copies the accumulated graph
    pub fn snapshot(&self) -> Graph {
        self.graph().snapshot()
    }

    fn graph(&self) -> MutexGuard<'_, LinkGraph> {
        // Every mutation leaves the graph consistent; a poisoned lock is still usable
        self.graph.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CrawlEvents for CrawlSession {
    fn on_link_found(&self, page_url: &str, href: &str, frontier: &dyn Frontier) {
        let target = match normalize_url(href) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Dropping link {} on {}: {}", href, page_url, e);
                return;
            }
        };
        let source = match normalize_url(page_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Dropping links of unattributable page {}: {}", page_url, e);
                return;
            }
        };

        let unvisited = {
            let mut graph = self.graph();
            let (source_id, _) = graph.lookup_or_allocate(&source);
            graph.add_node(source_id, &source);

            match graph.lookup(&target) {
                Some(target_id) => {
                    graph.add_edge(source_id, target_id);
                    false
                }
                None => {
                    let (target_id, _) = graph.lookup_or_allocate(&target);
                    graph.add_node(target_id, &target);
                    graph.add_edge(source_id, target_id);
                    true
                }
            }
        };

        if unvisited && !self.is_stopped() {
            frontier.visit(&target);
        }
    }

    fn on_redirect(&self, chain: &[Url], next: &Url) -> Result<(), CrawlError> {
        let mut graph = self.graph();
        resolve_redirect_chain(&mut graph, chain, next.as_str()).map(|_| ())
    }

    fn is_stopped(&self) -> bool {
        CrawlSession::is_stopped(self)
    }
}

/// Main crawler coordinator structure
///
/// One coordinator runs one crawl; it moves through [`CrawlState`] and ends
/// in either `Completed` or `Failed`.
pub struct Coordinator {
    config: Arc<Config>,
    state: CrawlState,
}

impl Coordinator {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            state: CrawlState::Idle,
        }
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    fn transition(&mut self, next: CrawlState) -> Result<(), CrawlError> {
        if !self.state.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::trace!("Crawl state {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    fn fail(&mut self, error: CrawlError) -> CrawlError {
        if self.state.is_active() {
            self.state = CrawlState::Failed;
        }
        error
    }

    /// Runs the crawl for `raw_seed`
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - The crawl finished, possibly cut short by the
    ///   time budget (`partial`)
    /// * `Err(CrawlError::InvalidSeed)` - The seed is malformed or its host
    ///   did not accept a connection
    /// * `Err(CrawlError::FetchEngineFailure)` - The seed could not be fetched
    pub async fn run(&mut self, raw_seed: &str) -> Result<CrawlResult, CrawlError> {
        self.transition(CrawlState::Seeding)?;

        let seed = match normalize_url(raw_seed) {
            Ok(seed) => seed,
            Err(e) => {
                tracing::debug!("Rejected seed {:?}: {}", raw_seed, e);
                return Err(self.fail(CrawlError::InvalidSeed));
            }
        };

        let reachable = match Url::parse(&seed) {
            Ok(url) => probe_reachable(&url, self.config.crawler.probe_timeout()).await,
            Err(_) => false,
        };
        if !reachable {
            tracing::info!("Seed {} is unreachable", seed);
            return Err(self.fail(CrawlError::InvalidSeed));
        }

        let session = Arc::new(CrawlSession::new());
        session.seed(&seed);

        let engine = match FetchEngine::new(&self.config, session.clone()) {
            Ok(engine) => engine,
            Err(e) => {
                return Err(self.fail(CrawlError::FetchEngineFailure {
                    url: seed,
                    reason: e.to_string(),
                }))
            }
        };

        self.transition(CrawlState::Running)?;
        tracing::info!(
            "Starting crawl of {} (max depth {}, budget {:?})",
            seed,
            self.config.crawler.max_depth,
            self.config.crawler.crawl_budget()
        );
        let started = Instant::now();

        let budget = self.config.crawler.crawl_budget();
        let stopper = session.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(budget).await;
            tracing::info!("Crawl budget of {:?} exhausted, stopping", budget);
            stopper.raise_stop();
        });

        let outcome = engine.run(&seed).await;
        timer.abort();

        if let Err(e) = outcome {
            tracing::error!("Crawl of {} failed: {}", seed, e);
            return Err(self.fail(e));
        }

        self.transition(CrawlState::Draining)?;
        let graph = session.snapshot();
        let partial = session.is_stopped();
        self.transition(CrawlState::Completed)?;

        let stats = GraphStatistics::from_graph(&graph);
        tracing::info!(
            "Crawl of {} completed in {:.2}s{}: {}",
            seed,
            started.elapsed().as_secs_f64(),
            if partial { " (partial)" } else { "" },
            stats
        );
        if stats.duplicate_edges() > 0 {
            tracing::debug!("{} links repeat an earlier link", stats.duplicate_edges());
        }

        Ok(CrawlResult { graph, partial })
    }
}

/// Runs a complete crawl for one seed
///
/// This is the entry point used by the HTTP service. Every call builds its
/// own session, HTTP client and frontier; nothing is shared between crawls.
///
/// # Example
///
/// ```no_run
/// use link_vis::config::Config;
/// use link_vis::crawler::run_crawl;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let result = run_crawl(Arc::new(Config::default()), "example.com").await?;
/// println!("{} pages", result.graph.nodes.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Arc<Config>, seed: &str) -> Result<CrawlResult, CrawlError> {
    let mut coordinator = Coordinator::new(config);
    coordinator.run(seed).await
}
