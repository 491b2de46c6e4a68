//! Output module for crawl results
//!
//! This module handles:
//! - Encoding crawl results and error bodies as JSON for the HTTP service
//! - Summarizing a finished graph for the logs

pub mod stats;
mod wire;

pub use stats::GraphStatistics;
pub use wire::{
    encode_errors, encode_response, CrawlResponse, FieldError, ValidationErrors,
};

use thiserror::Error;

/// Errors raised while producing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
}
