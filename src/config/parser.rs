use crate::config::types::{Config, CrawlerConfig, ServerConfig};
use crate::config::validation::validate;
use crate::{ConfigError, ConfigResult};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::str::FromStr;

/// Environment variables read by [`load_config_from_env`]
pub mod env {
    pub const REQUEST_LIMIT: &str = "REQUEST_LIMIT";
    pub const MAX_DEPTH: &str = "MAX_DEPTH";
    pub const TIMEOUT_S: &str = "TIMEOUT_S";
    pub const PARALLELISM: &str = "PARALLELISM";
    pub const CORS_ORIGIN: &str = "CORS_ORIGIN";
    pub const HOST: &str = "HOST";
    pub const PORT: &str = "PORT";
}

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use link_vis::config::load_config;
///
/// let config = load_config(Path::new("link-vis.toml")).unwrap();
/// println!("Max depth: {}", config.crawler.max_depth);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so deployments can tell which configuration is live.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> ConfigResult<(Config, String)> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Loads configuration from the process environment
///
/// A `.env` file in the working directory is read first when present.
/// `REQUEST_LIMIT`, `MAX_DEPTH` and `TIMEOUT_S` are required; `PARALLELISM`,
/// `CORS_ORIGIN` (`;`-separated), `HOST` and `PORT` are optional.
pub fn load_config_from_env() -> ConfigResult<Config> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let config = config_from_vars(|name| std::env::var(name).ok())?;
    validate(&config)?;
    Ok(config)
}

/// Builds a configuration from a variable lookup function
///
/// Separated from [`load_config_from_env`] so it can be exercised without
/// touching the process environment. No validation is performed here.
pub fn config_from_vars<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = Config::default();

    config.server.request_limit = required(&lookup, env::REQUEST_LIMIT)?;
    config.crawler = CrawlerConfig {
        max_depth: required(&lookup, env::MAX_DEPTH)?,
        timeout_secs: required(&lookup, env::TIMEOUT_S)?,
        ..config.crawler
    };

    if let Some(parallelism) = optional(&lookup, env::PARALLELISM)? {
        config.crawler.parallelism = parallelism;
    }

    config.server = ServerConfig {
        host: lookup(env::HOST)
            .filter(|h| !h.is_empty())
            .unwrap_or(config.server.host),
        port: optional(&lookup, env::PORT)?.unwrap_or(config.server.port),
        cors_origins: lookup(env::CORS_ORIGIN)
            .map(|origins| split_origins(&origins))
            .unwrap_or_default(),
        ..config.server
    };

    Ok(config)
}

fn split_origins(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn required<T, F>(lookup: &F, name: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, name)?.ok_or_else(|| ConfigError::MissingEnv(name.to_string()))
}

fn optional<T, F>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                name: name.to_string(),
                value,
            }),
    }
}
