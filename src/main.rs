//! Review Harvester main entry point
//!
//! This is the command-line interface for the album review harvester.

use anyhow::Context;
use clap::Parser;
use review_harvester::config::{load_config_with_hash, validate, Config};
use review_harvester::crawler::harvest;
use review_harvester::output::{load_statistics, print_report, print_statistics};
use review_harvester::storage::open_storage;
use review_harvester::url::{listing_url, parse_origin};
use review_harvester::Field;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Review Harvester: a bounded album review scraper
///
/// Walks a range of review listing pages, follows every review link, extracts a
/// fixed set of fields per review through the configured rule table, and appends
/// the records to a SQLite database.
#[derive(Parser, Debug)]
#[command(name = "review-harvester")]
#[command(version)]
#[command(about = "A bounded album review scraper", long_about = None)]
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

    /// First listing page to harvest (overrides the config file)
    #[arg(long, value_name = "N")]
    start_page: Option<u32>,

    /// Last listing page to harvest, inclusive (overrides the config file)
    #[arg(long, value_name = "N")]
    end_page: Option<u32>,

    /// Validate config and show what would be harvested without fetching anything
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

/// Exit status of an interrupted run, as for SIGINT
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::debug!("Configuration hash: {}", config_hash);

    if cli.start_page.is_some() || cli.end_page.is_some() {
        if let Some(start) = cli.start_page {
            config.harvest.start_page = start;
        }
        if let Some(end) = cli.end_page {
            config.harvest.end_page = end;
        }
        validate(&config).context("Invalid page range")?;
    }

    if cli.dry_run {
        handle_dry_run(&config)?;
        Ok(ExitCode::SUCCESS)
    } else if cli.stats {
        handle_stats(&config)?;
        Ok(ExitCode::SUCCESS)
    } else {
        handle_harvest(config, &config_hash).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("review_harvester=info,warn"),
            1 => EnvFilter::new("review_harvester=debug,info"),
            2 => EnvFilter::new("review_harvester=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be harvested
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let origin = parse_origin(&config.site.origin)?;
    let pages = config.harvest.pages();

    println!("=== Review Harvester Dry Run ===\n");

    println!("Site:");
    println!("  Origin: {}", origin);
    println!(
        "  First listing page: {}",
        listing_url(&origin, &config.site.listing_path, *pages.start())?
    );
    println!(
        "  Last listing page: {}",
        listing_url(&origin, &config.site.listing_path, *pages.end())?
    );

    println!("\nHarvest:");
    println!(
        "  Pages: {}..={} ({} pages)",
        pages.start(),
        pages.end(),
        config.harvest.page_count()
    );
    println!("  Page concurrency: {}", config.harvest.page_concurrency);
    println!("  Detail concurrency: {}", config.harvest.detail_concurrency);
    println!("  Deduplicate URLs: {}", config.harvest.dedupe_urls);

    println!("\nFetch:");
    println!("  Timeout: {}ms", config.fetch.timeout_ms);
    println!(
        "  Attempts: {} (backoff {}ms..{}ms)",
        config.fetch.max_attempts, config.fetch.backoff_base_ms, config.fetch.backoff_max_ms
    );
    println!("  User agent: {}", config.fetch.user_agent);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nRules ({}):", config.rules.fields.len());
    for field in Field::ALL {
        if let Some(rule) = config.rules.fields.get(&field) {
            println!(
                "  - {:<12} <{}> {}",
                field.name(),
                rule.tag,
                rule.class.as_deref().unwrap_or("")
            );
        }
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))
        .context("Failed to open the review database")?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, config_hash: &str) -> anyhow::Result<ExitCode> {
    let cancel = CancellationToken::new();

    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight writes");
            signal_token.cancel();
        }
    });

    let report = harvest(config, config_hash, cancel)
        .await
        .context("Harvest could not start")?;

    print_report(&report);

    let code = if report.cancelled {
        ExitCode::from(EXIT_INTERRUPTED)
    } else if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    };
    Ok(code)
}
