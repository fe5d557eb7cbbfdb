//! Sitespider main entry point
//!
//! This is the command-line interface for the Sitespider crawler and search index.

use clap::Parser;
use sitespider::config::{load_config_or_default, Config};
use sitespider::crawler::Crawler;
use sitespider::indexer::indexing_callback;
use sitespider::output::{load_statistics, print_search_results, print_statistics};
use sitespider::server::{serve, shutdown_signal, split_query};
use sitespider::storage::{open_storage, SharedStorage, SqliteStorage, Storage};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing_subscriber::EnvFilter;

/// Sitespider: a domain-scoped crawler and search index
///
/// Sitespider crawls one web site with a pool of concurrent workers,
/// indexes the words of every page into SQLite and serves a small
/// search front end over the result.
#[derive(Parser, Debug)]
#[command(name = "sitespider")]
#[command(version = "1.0.0")]
#[command(about = "A domain-scoped crawler and search index", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Crawl and index, then exit without serving
    #[arg(long, conflicts_with_all = ["serve_only", "stats", "search"])]
    crawl_only: bool,

    /// Serve the existing index without crawling
    #[arg(long, conflicts_with_all = ["crawl_only", "stats", "search"])]
    serve_only: bool,

    /// Show statistics from the index database and exit
    #[arg(long, conflicts_with_all = ["crawl_only", "serve_only", "search"])]
    stats: bool,

    /// Run one query against the index and exit
    #[arg(long, value_name = "QUERY", conflicts_with_all = ["crawl_only", "serve_only", "stats"])]
    search: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration; an unusable file falls back to defaults
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_or_default(&cli.config);
    if let Some(hash) = hash {
        tracing::info!("Configuration loaded successfully (hash: {})", hash);
    }

    // Handle different modes
    if cli.stats {
        handle_stats(&config)?;
    } else if let Some(query) = cli.search.as_deref() {
        handle_search(&config, query)?;
    } else {
        // Crawling has no default seed
        if !cli.serve_only {
            if let Err(e) = config.crawler.seed() {
                tracing::error!("Cannot crawl: {}", e);
                return Err(e.into());
            }
        }

        let storage = Arc::new(Mutex::new(open_storage(Path::new(
            &config.storage.database_path,
        ))?));

        if !cli.serve_only {
            handle_crawl(&config, storage.clone()).await?;
        }

        if !cli.crawl_only {
            handle_serve(&config, storage).await?;
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitespider=info,warn"),
            1 => EnvFilter::new("sitespider=debug,info"),
            2 => EnvFilter::new("sitespider=trace,debug"),
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

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", config.storage.database_path);

    let storage = SqliteStorage::new(Path::new(&config.storage.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --search mode: prints ranked results for one query
fn handle_search(config: &Config, query: &str) -> Result<(), Box<dyn std::error::Error>> {
    let words = split_query(query);
    if words.is_empty() {
        return Err("query contains no words".into());
    }

    let storage = SqliteStorage::new(Path::new(&config.storage.database_path))?;
    let results = storage.search(&words)?;
    print_search_results(&words, &results);

    Ok(())
}

/// Crawls the configured site, indexing every fetched page
async fn handle_crawl(
    config: &Config,
    storage: Arc<Mutex<SqliteStorage>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut crawler = Crawler::new(&config.crawler, &config.user_agent)?;

    // Ctrl-C stops the crawl; pages fetched so far stay indexed
    let stop = crawler.stop_handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping crawl");
            stop.stop();
        }
    });

    let shared: SharedStorage = storage.clone();
    let result = crawler
        .crawl(
            config.crawler.seed()?,
            config.crawler.max_depth,
            config.crawler.workers,
            indexing_callback(shared),
        )
        .await;
    interrupt.abort();

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    tracing::info!(
        "Crawl finished ({:?}): {} pages fetched in {:?}",
        summary.stop_reason,
        summary.pages_fetched,
        summary.elapsed
    );

    let documents = storage
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .count_documents()?;
    println!("{} documents indexed", documents);

    Ok(())
}

/// Serves the search front end until Ctrl-C
async fn handle_serve(
    config: &Config,
    storage: Arc<Mutex<SqliteStorage>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    serve(listener, storage, shutdown_signal()).await?;

    tracing::info!("Server stopped");
    Ok(())
}
