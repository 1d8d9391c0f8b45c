//! Sumi-Scribe main entry point
//!
//! This is the command-line interface for the Sumi-Scribe article harvester.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use sumi_scribe::config::{
    load_config_with_hash, parse_config, parse_seed_list, validate, Config, ExportFormat,
};
use sumi_scribe::crawler::crawl;
use sumi_scribe::output::{export_all, print_statistics};
use tracing_subscriber::EnvFilter;

/// Sumi-Scribe: an article harvester
///
/// Sumi-Scribe discovers article pages from seed URLs (pagination, sitemap
/// or a single listing page), extracts their text and images, drops
/// duplicate content and exports the result as CSV, JSON, PDF or XLSX.
#[derive(Parser, Debug)]
#[command(name = "sumi-scribe")]
#[command(version)]
#[command(about = "An article harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Seed URL, replacing the configured seeds (repeatable)
    #[arg(long = "seed", value_name = "URL")]
    seeds: Vec<String>,

    /// File with one seed URL per line, appended to the seeds
    #[arg(long, value_name = "FILE")]
    seeds_file: Option<PathBuf>,

    /// Export format, replacing the configured formats (repeatable)
    #[arg(long = "format", value_name = "FORMAT", value_parser = parse_format)]
    formats: Vec<ExportFormat>,

    /// Output directory, replacing the configured one
    #[arg(long, value_name = "DIR")]
    output_dir: Option<String>,
}

fn parse_format(name: &str) -> Result<ExportFormat, String> {
    ExportFormat::from_name(name)
        .ok_or_else(|| format!("unknown format '{}' (expected csv, json, pdf or xlsx)", name))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, cli.quiet).await
}

/// Loads the configuration file (if any) and applies command-line overrides
fn load(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            parse_config("").context("Failed to build default configuration")?
        }
    };

    if !cli.seeds.is_empty() {
        config.seeds = cli.seeds.clone();
        config.seed_list = None;
    }
    if let Some(path) = &cli.seeds_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seeds file {}", path.display()))?;
        config.seeds.extend(parse_seed_list(&text));
    }
    if !cli.formats.is_empty() {
        config.output.formats = cli.formats.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.clone();
    }

    validate(&config).context("Invalid configuration")?;
    if config.seed_urls().is_empty() {
        bail!("No seed URLs given: set `seeds` in the config or pass --seed");
    }

    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_scribe=info,warn"),
            1 => EnvFilter::new("sumi_scribe=debug,info"),
            2 => EnvFilter::new("sumi_scribe=trace,debug"),
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

/// Handles the --dry-run mode: shows the resolved configuration and seeds
fn handle_dry_run(config: &Config) {
    println!("=== Sumi-Scribe Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Discovery mode: {:?}", config.crawler.discovery_mode);
    println!("  Fetch strategy: {}", config.crawler.fetch_strategy.as_str());
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!("  Timeout: {}s", config.crawler.timeout_secs);
    println!(
        "  Attempts: {} ({}ms apart)",
        config.crawler.max_attempts, config.crawler.retry_delay_ms
    );
    println!("  Next-page labels: {:?}", config.crawler.next_labels);

    println!("\nUser Agent: {}", config.user_agent.identity());

    println!("\nFilter:");
    println!("  Exclude keywords: {:?}", config.filter.exclude_keywords);
    println!("  Case sensitive: {}", config.filter.case_sensitive);
    println!("  Filter images: {}", config.filter.filter_images);

    println!("\nExtraction: {:?}", config.extraction.policy);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    let formats: Vec<&str> = config.output.formats.iter().map(|f| f.extension()).collect();
    println!("  Formats: {}", formats.join(", "));
    println!("  Page directories: {}", config.output.page_directories);
    println!("  PDF per article: {}", config.output.pdf_per_article);

    let seeds = config.seed_urls();
    println!("\nSeeds ({}):", seeds.len());
    for seed in &seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, quiet: bool) -> anyhow::Result<()> {
    tracing::info!(
        "Starting crawl of {} seed URLs ({} strategy)",
        config.seed_urls().len(),
        config.crawler.fetch_strategy.as_str()
    );

    let result = crawl(config.clone()).await.context("Crawl failed")?;

    for warning in result.warnings() {
        tracing::warn!("{}", warning);
    }

    let report = export_all(&result, &config)
        .await
        .context("Failed to write output")?;

    for warning in &report.warnings {
        tracing::warn!("{}", warning);
    }

    if !quiet {
        print_statistics(result.stats());
        println!();
        for path in report.paths() {
            println!("✓ {}", path.display());
        }
    }

    Ok(())
}
