//! URL handling module for Link-Vis
//!
//! This module provides URL canonicalization and host extraction.

mod domain;
mod normalize;

pub use domain::{extract_domain, socket_address};
pub use normalize::normalize_url;
