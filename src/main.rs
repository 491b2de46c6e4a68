//! Link-Vis main entry point
//!
//! This is the command-line interface for the Link-Vis crawl service.

use clap::Parser;
use link_vis::config::{load_config_from_env, load_config_with_hash, Config};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Link-Vis: a link-graph explorer
///
/// Serves `GET /crawl?seed=<url>`, which crawls the hyperlink graph
/// reachable from the seed and returns it as JSON nodes and edges.
/// Without a CONFIG file the configuration is read from the environment
/// (REQUEST_LIMIT, MAX_DEPTH, TIMEOUT_S, and optionally PORT, HOST,
/// CORS_ORIGIN, PARALLELISM), including a `.env` file if present.
#[derive(Parser, Debug)]
#[command(name = "link-vis")]
#[command(version)]
#[command(about = "A link-graph explorer service", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the listening port
    #[arg(long)]
    port: Option<u16>,

    /// Override the listening address
    #[arg(long)]
    host: Option<String>,

    /// Validate config and print it without starting the server
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match load(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(host) = cli.host {
        config.server.host = host;
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    link_vis::server::serve(config).await
}

/// Loads configuration from the CONFIG file, or from the environment
fn load(cli: &Cli) -> link_vis::Result<Config> {
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("Loading configuration from environment");
            load_config_from_env()?
        }
    };
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("link_vis=info,tower_http=warn,warn"),
            1 => EnvFilter::new("link_vis=debug,tower_http=debug,info"),
            2 => EnvFilter::new("link_vis=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Link-Vis Dry Run ===\n");

    println!("Crawler Configuration:");
    if config.crawler.max_depth == 0 {
        println!("  Max depth: unlimited");
    } else {
        println!("  Max depth: {}", config.crawler.max_depth);
    }
    println!("  Parallelism: {}", config.crawler.parallelism);
    println!("  Crawl budget: {}s", config.crawler.timeout_secs);
    println!("  Seed probe timeout: {}ms", config.crawler.probe_timeout_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Max redirects: {}", config.crawler.max_redirects);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nServer:");
    println!("  Listen: {}:{}", config.server.host, config.server.port);
    println!("  Request limit: {}", config.server.request_limit);
    if config.server.cors_origins.is_empty() {
        println!("  CORS origins: any");
    } else {
        println!("  CORS origins:");
        for origin in &config.server.cors_origins {
            println!("    - {}", origin);
        }
    }

    println!("\n✓ Configuration is valid");
}
