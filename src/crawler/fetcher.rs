//! HTTP fetcher implementation
//!
//! This module handles all network I/O for a crawl:
//! - Building one HTTP client per crawl, with the user agent string and a
//!   redirect policy that reports every hop to the crawl's event handler
//! - GET requests and classification of their outcome
//! - The TCP reachability probe run against a seed before crawling

use crate::config::Config;
use crate::crawler::engine::CrawlEvents;
use crate::url::socket_address;
use reqwest::redirect::{Attempt, Policy};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use url::Url;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched an HTML page
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value
        content_type: String,
        /// Page body content
        body: String,
    },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// The server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
    },

    /// The redirect chain was rejected (too long, or a hop could not be
    /// attributed to the graph)
    RedirectError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Returns true if the request never produced a usable response
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Self::NetworkError { .. } | Self::RedirectError { .. })
    }
}

impl std::fmt::Display for FetchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success { status_code, .. } => write!(f, "HTTP {}", status_code),
            Self::ContentMismatch { content_type } => {
                write!(f, "unsupported Content-Type '{}'", content_type)
            }
            Self::HttpError { status_code } => write!(f, "HTTP {}", status_code),
            Self::NetworkError { error } | Self::RedirectError { error } => f.write_str(error),
        }
    }
}

/// Builds the HTTP client used by one crawl
///
/// Every redirect hop is handed to `events` before it is followed. If the
/// handler rejects the chain, or following it would take more than
/// `max-redirects` hops, the request fails with a redirect error.
///
/// # Arguments
///
/// * `config` - The service configuration
/// * `events` - The crawl's event handler
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    config: &Config,
    events: Arc<dyn CrawlEvents>,
) -> Result<Client, reqwest::Error> {
    let max_redirects = config.crawler.max_redirects;

    let policy = Policy::custom(move |attempt: Attempt| {
        if attempt.previous().len() > max_redirects {
            return attempt.error(format!("too many redirects (limit {})", max_redirects));
        }

        match events.on_redirect(attempt.previous(), attempt.url()) {
            Ok(()) => attempt.follow(),
            Err(e) => attempt.error(e),
        }
    });

    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(config.crawler.request_timeout())
        .connect_timeout(Duration::from_secs(10))
        .redirect(policy)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with an HTML (or missing) Content-Type | `Success` |
/// | 2xx with any other Content-Type | `ContentMismatch` |
/// | Any other status | `HttpError` |
/// | Rejected redirect chain | `RedirectError` |
/// | Timeout, refused connection, TLS failure | `NetworkError` |
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(e),
    };

    let status = response.status();
    let final_url = response.url().clone();

    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_html(&content_type) {
        return FetchResult::ContentMismatch { content_type };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
        },
        Err(e) => classify_error(e),
    }
}

fn classify_error(e: reqwest::Error) -> FetchResult {
    if e.is_redirect() {
        FetchResult::RedirectError {
            error: e.to_string(),
        }
    } else if e.is_timeout() {
        FetchResult::NetworkError {
            error: "Request timeout".to_string(),
        }
    } else if e.is_connect() {
        FetchResult::NetworkError {
            error: "Connection refused".to_string(),
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
        }
    }
}

/// A missing Content-Type is given the benefit of the doubt
fn is_html(content_type: &str) -> bool {
    content_type.is_empty() || content_type.to_ascii_lowercase().contains("html")
}

/// Checks that the host of `url` accepts a TCP connection within `timeout`
pub async fn probe_reachable(url: &Url, timeout: Duration) -> bool {
    let Some((host, port)) = socket_address(url) else {
        return false;
    };

    match tokio::time::timeout(timeout, TcpStream::connect((host.as_str(), port))).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            tracing::debug!("Probe of {}:{} failed: {}", host, port, e);
            false
        }
        Err(_) => {
            tracing::debug!("Probe of {}:{} timed out after {:?}", host, port, timeout);
            false
        }
    }
}
