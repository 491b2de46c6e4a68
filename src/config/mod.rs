//! Configuration module for Link-Vis
//!
//! Configuration comes either from a TOML file or from the process
//! environment (optionally seeded from a `.env` file). Both paths are
//! validated before the service starts.
//!
//! # Example
//!
//! ```no_run
//! use link_vis::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("link-vis.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, ServerConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{
    compute_config_hash, config_from_vars, env, load_config, load_config_from_env,
    load_config_with_hash,
};

pub use validation::validate;
