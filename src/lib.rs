//! Link-Vis: a link-graph explorer
//!
//! This crate implements a small web service that, given a seed address, crawls
//! the hyperlink graph reachable from it up to a bounded depth and returns the
//! discovered pages and links as a directed graph.

pub mod config;
pub mod crawler;
pub mod graph;
pub mod output;
pub mod server;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Link-Vis operations
#[derive(Debug, Error)]
pub enum LinkVisError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Crawl error: {0}")]
    Crawl(#[from] CrawlError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),

    #[error("Invalid value for environment variable {name}: '{value}'")]
    InvalidEnv { name: String, value: String },
}

/// URL-specific errors
///
/// Normalization failures are coarse: a bad percent escape, an
/// unparsable string and a missing host all surface as the same condition.
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Invalid URL: {0}")]
    Invalid(String),
}

/// Crawl-level errors
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The seed failed normalization or the reachability probe
    #[error("Invalid seed URL")]
    InvalidSeed,

    /// A hop in a redirect chain could not be normalized
    #[error("Redirect chain could not be attributed to the graph")]
    InvalidRedirectTarget,

    /// The fetch engine could not dispatch the seed
    #[error("Fetch engine failed for {url}: {reason}")]
    FetchEngineFailure { url: String, reason: String },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        from: state::CrawlState,
        to: state::CrawlState,
    },
}

/// Result type alias for Link-Vis operations
pub type Result<T> = std::result::Result<T, LinkVisError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, CrawlResult};
pub use graph::{Edge, Graph, Node, NodeId};
pub use state::CrawlState;
pub use url::normalize_url;
