//! Region Overpass CLI
//!
//! Scans a TLE catalog for every second each satellite spends over a region.
//!
//! Usage:
//!   scan-overpass --catalog 30sats.txt \
//!                 --corner 10,10 --corner 10,20 --corner 20,20 --corner 20,10 \
//!                 --output filteredresults.txt
//!
//! Without `--corner` (and no region in `--config`), the corners are asked for
//! on the terminal.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use orbital_mechanics::{Sgp4, Wgs84};
use region_overpass::catalog::load_catalog;
use region_overpass::output::{self, OutputFormat};
use region_overpass::prompt::prompt_region;
use region_overpass::{Corner, MalformedPolicy, Region, RunConfig, WorkerPool};
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "scan-overpass",
    about = "Find when catalog satellites pass over a geographic region"
)]
struct Args {
    /// TLE catalog (2-line or 3-line format)
    #[arg(short = 'c', long, default_value = "30sats.txt")]
    catalog: PathBuf,

    /// JSON run configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Region corner as LAT,LON (give exactly four)
    #[arg(long = "corner", value_name = "LAT,LON", allow_hyphen_values = true)]
    corners: Vec<Corner>,

    /// Simulation start (RFC 3339)
    #[arg(long)]
    start: Option<DateTime<Utc>>,

    /// Seconds simulated per satellite
    #[arg(long)]
    horizon_seconds: Option<u32>,

    /// Worker pool size
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// Match buffer ceiling for the whole run, in bytes
    #[arg(long, conflicts_with = "no_memory_limit")]
    memory_limit: Option<u64>,

    /// Disable the match buffer ceiling
    #[arg(long)]
    no_memory_limit: bool,

    /// Handling of unparseable element sets
    #[arg(long, value_enum)]
    malformed: Option<MalformedPolicy>,

    /// Output file
    #[arg(short, long, default_value = "filteredresults.txt")]
    output: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_filter = if args.verbose {
        "region_overpass=debug,orbital_mechanics=debug,info"
    } else {
        "region_overpass=info,info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    info!("{}", "=".repeat(60));
    info!("Region Overpass Scanner");
    info!("{}", "=".repeat(60));

    let config = resolve_config(&args)?;
    let region = resolve_region(&args, &config)?;
    info!("Region: {}", region);

    let catalog = load_catalog(&args.catalog)
        .with_context(|| format!("loading catalog {:?}", args.catalog))?;

    let pool = WorkerPool::initialize(&config)?;
    let report = pool.run(
        catalog,
        &region,
        config.window(),
        &Sgp4,
        &Wgs84,
        config.malformed_policy,
    );
    pool.shutdown();
    let report = report?;

    println!("Execution time: {} seconds", report.elapsed.as_secs_f64());

    output::save(&args.output, args.format, &report.results)
        .with_context(|| format!("writing {:?}", args.output))?;

    // Summary
    info!("{}", "=".repeat(60));
    info!("SUMMARY");
    info!("{}", "=".repeat(60));
    info!("Run id: {}", report.run_id);
    info!("Satellites scanned: {}", report.satellites_scanned);
    info!(
        "Samples: {} ({} skipped on propagation errors)",
        report.samples, report.skipped_samples
    );
    for sat in &report.results.satellites {
        info!("  {}: {} matches", sat.name, sat.matches.len());
    }
    for skipped in &report.results.skipped {
        info!("  {}: skipped ({})", skipped.name, skipped.reason);
    }

    Ok(())
}

/// Defaults, then the config file, then flags
fn resolve_config(args: &Args) -> Result<RunConfig> {
    let mut config = match &args.config {
        Some(path) => RunConfig::load(path).with_context(|| format!("loading config {:?}", path))?,
        None => RunConfig::default(),
    };

    if let Some(start) = args.start {
        config = config.start_epoch(start);
    }
    if let Some(seconds) = args.horizon_seconds {
        config = config.horizon_seconds(seconds);
    }
    if let Some(workers) = args.workers {
        config = config.workers(workers);
    }
    if args.no_memory_limit {
        config = config.memory_limit_bytes(None);
    } else if let Some(limit) = args.memory_limit {
        config = config.memory_limit_bytes(Some(limit));
    }
    if let Some(policy) = args.malformed {
        config = config.malformed_policy(policy);
    }

    config.validate()?;
    Ok(config)
}

/// Flags, then the config file, then the terminal
fn resolve_region(args: &Args, config: &RunConfig) -> Result<Region> {
    if !args.corners.is_empty() {
        return Ok(Region::from_corners(args.corners.clone())?);
    }
    if let Some(region) = &config.region {
        return Ok(region.clone());
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    prompt_region(&mut input, &mut output).context("reading region corners")
}
