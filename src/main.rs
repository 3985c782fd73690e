//! Link-Weaver main entry point
//!
//! This is the command-line interface for the Link-Weaver link graph crawler.

use anyhow::Context;
use clap::Parser;
use link_weaver::config::{load_config_with_hash, validate, Config};
use link_weaver::crawler::crawl;
use link_weaver::output::{build_report, load_statistics_from, print_report, print_statistics};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Link-Weaver: a same-domain link graph crawler
///
/// Link-Weaver crawls a website from a seed address, follows redirects,
/// and records every page, link, link title and redirection it meets in
/// a SQLite link graph.
#[derive(Parser, Debug)]
#[command(name = "link-weaver")]
#[command(version)]
#[command(about = "A same-domain link graph crawler", long_about = None)]
struct Cli {
    /// Absolute address to start crawling from
    #[arg(value_name = "SEED", required_unless_present = "stats")]
    seed: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// SQLite database path (`:memory:` for a throwaway graph)
    #[arg(short, long, value_name = "PATH")]
    database: Option<String>,

    /// Maximum redirects followed per fetch
    #[arg(long, value_name = "N")]
    redirect_limit: Option<u32>,

    /// Strip query strings before requesting
    #[arg(long)]
    no_query_params: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show statistics from the database and exit
    #[arg(long)]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load(&cli)?;

    if cli.stats {
        handle_stats(&config)
    } else {
        let seed = cli.seed.as_deref().context("a seed address is required")?;
        handle_crawl(config, seed, &config_hash).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("link_weaver=info,warn"),
            1 => EnvFilter::new("link_weaver=debug,info"),
            2 => EnvFilter::new("link_weaver=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the configuration file, if any, and applies command-line overrides
fn load(cli: &Cli) -> anyhow::Result<(Config, String)> {
    let (mut config, hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, hash)
        }
        None => (Config::default(), "defaults".to_string()),
    };

    if let Some(database) = &cli.database {
        config.output.database_path = database.clone();
    }
    if let Some(limit) = cli.redirect_limit {
        config.crawler.redirect_limit = limit;
    }
    if cli.no_query_params {
        config.crawler.include_query_params = false;
    }

    validate(&config).context("invalid command-line options")?;
    Ok((config, hash))
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let stats = load_statistics_from(&config.output.database_path)?;
    print_statistics(&stats);

    Ok(())
}

/// Crawls from the seed and prints the link report
async fn handle_crawl(config: Config, seed: &str, config_hash: &str) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} (redirect limit {}, query params {})",
        seed,
        config.crawler.redirect_limit,
        if config.crawler.include_query_params { "kept" } else { "stripped" }
    );

    let (storage, summary) = crawl(config, seed, config_hash)
        .await
        .with_context(|| format!("crawl from {} failed", seed))?;

    tracing::info!(
        "Fetched {} pages, followed {} redirects",
        summary.pages,
        summary.redirects
    );

    let report = build_report(&storage)?;
    print_report(&report);

    Ok(())
}
