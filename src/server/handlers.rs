//! HTTP handlers.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use super::AppState;
use crate::crawler::run_crawl;
use crate::output::{encode_errors, encode_response, ValidationErrors};
use crate::CrawlError;

/// Query parameters of `/crawl`.
#[derive(Debug, Default, Deserialize)]
pub struct CrawlParams {
    /// Missing is treated the same as empty: an invalid seed.
    #[serde(default)]
    pub seed: String,
}

/// `GET /`
pub async fn home_handler() -> &'static str {
    "Here be dragons!"
}

/// `GET /crawl?seed=<url>`
pub async fn crawl_handler(
    State(state): State<AppState>,
    params: Result<Query<CrawlParams>, QueryRejection>,
) -> Response {
    let params = match params {
        Ok(Query(params)) => params,
        Err(e) => {
            tracing::debug!("Unreadable crawl query: {}", e);
            CrawlParams::default()
        }
    };

    match run_crawl(state.config.clone(), &params.seed).await {
        Ok(result) => match encode_response(&result) {
            Ok(body) => json_response(StatusCode::OK, body),
            Err(e) => {
                tracing::error!("Failed to serialize crawl of {}: {}", params.seed, e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        },
        Err(CrawlError::InvalidSeed) => {
            error_response(StatusCode::BAD_REQUEST, &ValidationErrors::invalid_url())
        }
        Err(e) => {
            tracing::error!("Crawl of {} failed: {}", params.seed, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &ValidationErrors::crawl_failed(),
            )
        }
    }
}

fn json_response(status: StatusCode, body: Vec<u8>) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

fn error_response(status: StatusCode, errors: &ValidationErrors) -> Response {
    match encode_errors(errors) {
        Ok(body) => json_response(status, body),
        Err(e) => {
            tracing::error!("Failed to serialize error body: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
