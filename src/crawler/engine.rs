//! Fetch engine
//!
//! The engine owns everything about moving bytes: the HTTP client, the
//! frontier queue, depth accounting and per-crawl parallelism. It knows
//! nothing about the graph. Discovery is reported through [`CrawlEvents`]
//! and the handler asks for more work through the [`Frontier`] it is given.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchResult};
use crate::crawler::parser::parse_html;
use crate::CrawlError;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use url::Url;

/// Depth of the seed page
pub const SEED_DEPTH: u32 = 1;

/// Handle through which an event handler schedules further fetches
pub trait Frontier: Send + Sync {
    /// Schedules a fetch of `url` one level below the page being processed
    ///
    /// Returns false if the request was refused: the depth limit is reached,
    /// the URL is not fetchable, or it was already requested in this crawl.
    fn visit(&self, url: &str) -> bool;
}

/// Receiver of discovery events raised while fetching
///
/// Handlers are called concurrently from several fetch tasks and from the
/// HTTP client's redirect policy. They must not block for long.
pub trait CrawlEvents: Send + Sync {
    /// Called for every followable anchor on a fetched HTML page
    ///
    /// `page_url` is the final URL of the page after redirects; `href` is
    /// the attribute value exactly as written in the document.
    fn on_link_found(&self, page_url: &str, href: &str, frontier: &dyn Frontier);

    /// Called before a redirect is followed
    ///
    /// `chain` holds every URL requested so far for this fetch, starting with
    /// the original one; `next` is the URL about to be requested. Returning
    /// an error abandons the request.
    fn on_redirect(&self, chain: &[Url], next: &Url) -> Result<(), CrawlError>;

    /// Queued fetches that have not started yet are dropped once this
    /// returns true. In-flight fetches are never interrupted.
    fn is_stopped(&self) -> bool {
        false
    }
}

/// A URL waiting to be fetched
#[derive(Debug, Clone)]
struct FetchJob {
    url: Url,
    depth: u32,
}

/// Counters reported when a crawl's fetch work is exhausted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub pages_fetched: usize,
    pub pages_failed: usize,
    pub jobs_abandoned: usize,
}

/// Shared queue state: the channel new work goes into and the set of URLs
/// that have already been requested in this crawl
struct FrontierQueue {
    tx: mpsc::UnboundedSender<FetchJob>,
    requested: Mutex<HashSet<String>>,
    max_depth: u32,
}

impl FrontierQueue {
    fn new(tx: mpsc::UnboundedSender<FetchJob>, max_depth: u32) -> Self {
        Self {
            tx,
            requested: Mutex::new(HashSet::new()),
            max_depth,
        }
    }

    /// Returns true the first time `url` is marked
    fn mark_requested(&self, url: &str) -> bool {
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string())
    }

    fn within_depth(&self, depth: u32) -> bool {
        self.max_depth == 0 || depth <= self.max_depth
    }
}

/// The frontier handed to handlers while one page is being processed
struct PageFrontier<'a> {
    queue: &'a FrontierQueue,
    depth: u32,
}

impl Frontier for PageFrontier<'_> {
    fn visit(&self, url: &str) -> bool {
        let depth = self.depth + 1;
        if !self.queue.within_depth(depth) {
            return false;
        }

        let Ok(url) = Url::parse(url) else {
            return false;
        };
        if !is_fetchable(&url) {
            return false;
        }

        if !self.queue.mark_requested(url.as_str()) {
            return false;
        }

        self.queue.tx.send(FetchJob { url, depth }).is_ok()
    }
}

fn is_fetchable(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Result of one fetch task
enum PageOutcome {
    Fetched,
    Failed,
    Abandoned,
}

/// Fetches pages for one crawl
pub struct FetchEngine {
    client: Client,
    events: Arc<dyn CrawlEvents>,
    max_depth: u32,
    parallelism: usize,
}

impl FetchEngine {
    /// Creates an engine that reports to `events`
    ///
    /// The HTTP client is built here, so each crawl gets its own.
    pub fn new(config: &Config, events: Arc<dyn CrawlEvents>) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config, events.clone())?;

        Ok(Self {
            client,
            events,
            max_depth: config.crawler.max_depth,
            parallelism: config.crawler.parallelism.max(1) as usize,
        })
    }

    /// Crawls from `seed` until every scheduled fetch has completed or been
    /// abandoned
    ///
    /// Fails only if the seed itself cannot be dispatched: the URL is not
    /// http(s), or its request fails at the transport level. An HTTP error
    /// status or a non-HTML seed is a normal, empty crawl.
    pub async fn run(&self, seed: &str) -> Result<EngineStats, CrawlError> {
        let seed_url = Url::parse(seed).map_err(|e| CrawlError::FetchEngineFailure {
            url: seed.to_string(),
            reason: e.to_string(),
        })?;

        if !is_fetchable(&seed_url) {
            return Err(CrawlError::FetchEngineFailure {
                url: seed.to_string(),
                reason: format!("unsupported scheme '{}'", seed_url.scheme()),
            });
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        let queue = Arc::new(FrontierQueue::new(tx, self.max_depth));
        queue.mark_requested(seed_url.as_str());

        let mut stats = EngineStats::default();

        let seed_result = fetch_url(&self.client, seed_url.as_str()).await;
        if seed_result.is_transport_failure() {
            return Err(CrawlError::FetchEngineFailure {
                url: seed.to_string(),
                reason: seed_result.to_string(),
            });
        }
        match process_page(self.events.as_ref(), &queue, &seed_url, SEED_DEPTH, seed_result) {
            PageOutcome::Fetched => stats.pages_fetched += 1,
            PageOutcome::Failed => stats.pages_failed += 1,
            PageOutcome::Abandoned => stats.jobs_abandoned += 1,
        }

        let permits = Arc::new(Semaphore::new(self.parallelism));
        let mut tasks: JoinSet<PageOutcome> = JoinSet::new();

        loop {
            if tasks.is_empty() {
                match rx.try_recv() {
                    Ok(job) => {
                        self.spawn_fetch(&mut tasks, &permits, &queue, job);
                        continue;
                    }
                    Err(_) => break,
                }
            }

            tokio::select! {
                Some(job) = rx.recv() => {
                    self.spawn_fetch(&mut tasks, &permits, &queue, job);
                }
                Some(joined) = tasks.join_next() => {
                    match joined {
                        Ok(PageOutcome::Fetched) => stats.pages_fetched += 1,
                        Ok(PageOutcome::Failed) => stats.pages_failed += 1,
                        Ok(PageOutcome::Abandoned) => stats.jobs_abandoned += 1,
                        Err(e) => {
                            tracing::warn!("Fetch task ended abnormally: {}", e);
                            stats.pages_failed += 1;
                        }
                    }
                }
                else => break,
            }
        }

        tracing::debug!(
            "Fetch engine finished: {} fetched, {} failed, {} abandoned",
            stats.pages_fetched,
            stats.pages_failed,
            stats.jobs_abandoned
        );

        Ok(stats)
    }

    fn spawn_fetch(
        &self,
        tasks: &mut JoinSet<PageOutcome>,
        permits: &Arc<Semaphore>,
        queue: &Arc<FrontierQueue>,
        job: FetchJob,
    ) {
        let client = self.client.clone();
        let events = self.events.clone();
        let permits = permits.clone();
        let queue = queue.clone();

        tasks.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return PageOutcome::Abandoned;
            };

            if events.is_stopped() {
                tracing::debug!("Dropping queued fetch of {} after stop", job.url);
                return PageOutcome::Abandoned;
            }

            let result = fetch_url(&client, job.url.as_str()).await;
            process_page(events.as_ref(), &queue, &job.url, job.depth, result)
        });
    }
}

/// Reports the links of a fetched page to the handler
///
/// Runs synchronously: the parsed document is dropped before returning, so
/// nothing borrowed from it is held across an await point.
fn process_page(
    events: &dyn CrawlEvents,
    queue: &FrontierQueue,
    requested_url: &Url,
    depth: u32,
    result: FetchResult,
) -> PageOutcome {
    match result {
        FetchResult::Success {
            final_url, body, ..
        } => {
            let parsed = parse_html(&body);
            tracing::debug!(
                "Fetched {} (depth {}): {} links, {} skipped",
                final_url,
                depth,
                parsed.links.len(),
                parsed.skipped
            );

            let frontier = PageFrontier { queue, depth };
            for href in &parsed.links {
                events.on_link_found(final_url.as_str(), href, &frontier);
            }
            PageOutcome::Fetched
        }
        FetchResult::ContentMismatch { content_type } => {
            tracing::debug!("Skipping {} (Content-Type: {})", requested_url, content_type);
            PageOutcome::Fetched
        }
        FetchResult::HttpError { status_code } => {
            tracing::warn!("Fetch of {} returned HTTP {}", requested_url, status_code);
            PageOutcome::Failed
        }
        FetchResult::NetworkError { error } => {
            tracing::warn!("Fetch of {} failed: {}", requested_url, error);
            PageOutcome::Failed
        }
        FetchResult::RedirectError { error } => {
            tracing::debug!("Abandoned {} after redirect: {}", requested_url, error);
            PageOutcome::Abandoned
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(max_depth: u32) -> (FrontierQueue, mpsc::UnboundedReceiver<FetchJob>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (FrontierQueue::new(tx, max_depth), rx)
    }

    #[test]
    fn test_visit_queues_one_level_deeper() {
        let (queue, mut rx) = queue(3);
        let frontier = PageFrontier {
            queue: &queue,
            depth: SEED_DEPTH,
        };

        assert!(frontier.visit("http://a.com/next"));

        let job = rx.try_recv().unwrap();
        assert_eq!(job.url.as_str(), "http://a.com/next");
        assert_eq!(job.depth, 2);
    }

    #[test]
    fn test_visit_respects_depth_limit() {
        let (queue, mut rx) = queue(2);
        let frontier = PageFrontier {
            queue: &queue,
            depth: 2,
        };

        assert!(!frontier.visit("http://a.com/too-deep"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_zero_depth_is_unlimited() {
        let (queue, mut rx) = queue(0);
        let frontier = PageFrontier {
            queue: &queue,
            depth: 500,
        };

        assert!(frontier.visit("http://a.com/deep"));
        assert_eq!(rx.try_recv().unwrap().depth, 501);
    }

    #[test]
    fn test_visit_requests_each_url_once() {
        let (queue, mut rx) = queue(0);
        let frontier = PageFrontier {
            queue: &queue,
            depth: SEED_DEPTH,
        };

        assert!(frontier.visit("http://a.com/page"));
        assert!(!frontier.visit("http://a.com/page"));

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_visit_rejects_unfetchable_urls() {
        let (queue, mut rx) = queue(0);
        let frontier = PageFrontier {
            queue: &queue,
            depth: SEED_DEPTH,
        };

        assert!(!frontier.visit("ftp://a.com/file"));
        assert!(!frontier.visit("not a url"));
        assert!(rx.try_recv().is_err());
    }
}
