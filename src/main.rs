//! Sumi-Sift main entry point
//!
//! This is the command-line interface for the Sumi-Sift sitemap crawler.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::{Path, PathBuf};
use sumi_sift::config::{hash_content, load_config_with_hash, validate, Config};
use sumi_sift::crawler::{crawl, ParserKind};
use sumi_sift::output::{generate_summary, print_records, print_statistics, CrawlSummary};
use sumi_sift::storage::SqliteStorage;
use tracing_subscriber::EnvFilter;

/// Sumi-Sift: a two-phase sitemap crawler
///
/// Sumi-Sift expands a (possibly nested) sitemap into its page URLs, then
/// fetches every page concurrently and prints its title, first heading,
/// meta description and HTTP status.
#[derive(Parser, Debug)]
#[command(name = "sumi-sift")]
#[command(version = "1.0.0")]
#[command(about = "A two-phase sitemap crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Root sitemap URL (required without a config file)
    #[arg(long, value_name = "URL")]
    root: Option<String>,

    /// Maximum concurrent page fetches
    #[arg(long, value_name = "N")]
    concurrency: Option<u32>,

    /// Metadata extractor: default or verbatim
    #[arg(long, value_name = "KIND")]
    parser: Option<ParserKind>,

    /// Overall crawl deadline in seconds
    #[arg(long, value_name = "SECS")]
    crawl_timeout: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics of the last exported run and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

impl Cli {
    fn has_overrides(&self) -> bool {
        self.root.is_some()
            || self.concurrency.is_some()
            || self.parser.is_some()
            || self.crawl_timeout.is_some()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = resolve_config(&cli)?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(&config, &config_hash, cli.quiet).await?;
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
            0 => EnvFilter::new("sumi_sift=info,warn"),
            1 => EnvFilter::new("sumi_sift=debug,info"),
            2 => EnvFilter::new("sumi_sift=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the config file (if any), applies CLI overrides and re-validates
fn resolve_config(cli: &Cli) -> anyhow::Result<(Config, String)> {
    let (mut config, file_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            (config, Some(hash))
        }
        None => match &cli.root {
            Some(root) => (Config::for_root(root.clone()), None),
            None => bail!("Either a CONFIG file or --root must be given"),
        },
    };

    if let Some(root) = &cli.root {
        config.crawler.root_url = root.clone();
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.concurrency = concurrency;
    }
    if let Some(parser) = cli.parser {
        config.crawler.parser = parser;
    }
    if let Some(crawl_timeout) = cli.crawl_timeout {
        config.crawler.crawl_timeout = Some(crawl_timeout);
    }

    validate(&config).context("Invalid configuration")?;

    let hash = match file_hash {
        Some(hash) if !cli.has_overrides() => hash,
        _ => hash_content(&format!("{:?}", config)),
    };

    Ok((config, hash))
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Sumi-Sift Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Root sitemap: {}", config.crawler.root_url);
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!("  Request timeout: {}s", config.crawler.request_timeout);
    match config.crawler.crawl_timeout {
        Some(secs) => println!("  Crawl timeout: {}s", secs),
        None => println!("  Crawl timeout: none"),
    }
    println!("  Max sitemap depth: {}", config.crawler.max_sitemap_depth);
    println!("  Parser: {}", config.crawler.parser);

    println!("\nUser Agents:");
    if config.user_agent.pool.is_empty() {
        println!("  (built-in pool)");
    }
    for agent in &config.user_agent.pool {
        println!("  - {}", agent);
    }

    println!("\nOutput:");
    println!(
        "  Database: {}",
        config.output.database_path.as_deref().unwrap_or("(none)")
    );
    println!(
        "  Summary: {}",
        config.output.summary_path.as_deref().unwrap_or("(none)")
    );

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics of the last stored run
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let Some(database_path) = &config.output.database_path else {
        bail!("--stats requires output.database-path in the configuration");
    };

    println!("Database: {}\n", database_path);

    let storage = SqliteStorage::new(Path::new(database_path))?;
    let summary = generate_summary(&storage)?;
    print_statistics(&summary);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str, quiet: bool) -> anyhow::Result<()> {
    let outcome = match crawl(config, config_hash).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };
    let report = &outcome.report;

    print_records(&report.records);

    if !quiet {
        println!();
        print_statistics(&CrawlSummary::from_report(report, config_hash));
    }

    outcome.export?;
    Ok(())
}
