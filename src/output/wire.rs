//! JSON bodies returned by the HTTP service
//!
//! Node and edge identifiers are written as strings (see [`crate::graph`]).

use crate::crawler::CrawlResult;
use crate::graph::Graph;
use crate::output::OutputError;
use serde::Serialize;

/// Body of a successful `/crawl` response
#[derive(Debug, Clone, Serialize)]
pub struct CrawlResponse<'a> {
    pub data: &'a Graph,
    pub partial: bool,
}

impl<'a> From<&'a CrawlResult> for CrawlResponse<'a> {
    fn from(result: &'a CrawlResult) -> Self {
        Self {
            data: &result.graph,
            partial: result.partial,
        }
    }
}

/// One field-level problem reported to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Body of an error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn single(field: &str, message: &str) -> Self {
        Self {
            errors: vec![FieldError {
                field: field.to_string(),
                message: message.to_string(),
            }],
        }
    }

    /// The seed could not be normalized or its host was unreachable
    pub fn invalid_url() -> Self {
        Self::single("url", "Invalid URL")
    }

    /// The crawl failed after the seed was accepted
    pub fn crawl_failed() -> Self {
        Self::single("crawl", "Crawl failed")
    }
}

/// Serializes a crawl result into the response body
pub fn encode_response(result: &CrawlResult) -> Result<Vec<u8>, OutputError> {
    Ok(serde_json::to_vec(&CrawlResponse::from(result))?)
}

/// Serializes an error body
pub fn encode_errors(errors: &ValidationErrors) -> Result<Vec<u8>, OutputError> {
    Ok(serde_json::to_vec(errors)?)
}
