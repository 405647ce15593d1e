//! Region sweep: enumerate facilities of one kind inside a city or county
//! and optionally reconcile them with a property dataset.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use canopy::boundary::{BoundaryResolver, OverpassClient};
use canopy::config::Config;
use canopy::matching::CrossReferencer;
use canopy::pip::BoundaryFilter;
use canopy::records::load_records;
use canopy::search::{PlacesClient, SearchAggregator};
use canopy::{RegionDescriptor, RegionKind, SweepSettings, Sweeper};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Keep only records corroborated by the sweep
    Filter,
    /// Union of records and swept places
    Merge,
}

#[derive(Parser, Debug)]
#[command(name = "sweep")]
#[command(about = "Enumerate places of one kind inside a city or county")]
struct Args {
    /// Region name, e.g. "Columbia" or "Orange County"
    #[arg(long)]
    region: String,

    /// Region kind
    #[arg(long, default_value = "city")]
    kind: RegionKind,

    /// Full state name, e.g. "South Carolina"
    #[arg(long)]
    state: String,

    /// Search keyword, e.g. "gym"
    #[arg(long)]
    keyword: String,

    /// Property records CSV (optionally .gz) to reconcile
    #[arg(long)]
    records: Option<PathBuf>,

    /// How records are reconciled with the sweep
    #[arg(long, value_enum, default_value = "filter")]
    mode: Mode,

    /// Write the JSON report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override search.radius_meters
    #[arg(long)]
    radius_meters: Option<u32>,

    /// Override search.max_requests
    #[arg(long)]
    max_requests: Option<usize>,

    /// Places API key
    #[arg(long, env = "PLACES_API_KEY", hide_env_values = true)]
    api_key: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(radius) = args.radius_meters {
        config.search.radius_meters = radius;
    }
    if let Some(max) = args.max_requests {
        config.search.max_requests = max;
    }
    config.validate()?;

    let region = RegionDescriptor::new(&args.region, args.kind, &args.state);
    info!("Canopy sweep");
    info!("Region: {}", region);
    info!("Keyword: {}", args.keyword);

    // Load records before spending any search budget
    let records = match &args.records {
        Some(path) => Some(load_records(path)?),
        None => None,
    };

    let overpass = OverpassClient::new(
        &config.boundary.endpoint,
        Duration::from_secs(config.boundary.timeout_secs),
    )
    .context("Failed to build boundary client")?;

    let places = PlacesClient::new(
        &config.search.endpoint,
        args.api_key.clone(),
        Duration::from_secs(config.search.timeout_secs),
    )
    .context("Failed to build places client")?;

    let sweeper = Sweeper::new(
        BoundaryResolver::new(Arc::new(overpass), config.boundary.timeout_secs),
        SearchAggregator::new(
            Arc::new(places),
            config.search.pacer()?,
            config.search.max_pages_per_probe,
        ),
        BoundaryFilter::new(config.matching.dedup),
        SweepSettings {
            radius_meters: config.search.radius_meters,
            max_requests: config.search.max_requests,
        },
    );

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .context("Invalid progress template")?,
    );
    spinner.set_message(format!("Sweeping {} for '{}'", region, args.keyword));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result = sweeper.run(&region, &args.keyword).await;
    spinner.finish_and_clear();
    let mut report = result.with_context(|| format!("Sweep failed for {}", region))?;

    if let Some(records) = records {
        let matcher = CrossReferencer::new(config.matching.proximity);
        match args.mode {
            Mode::Filter => {
                let (kept, decisions) = matcher.reconcile(records, &report.places);
                report.records = Some(kept);
                report.decisions = decisions;
            }
            Mode::Merge => {
                report.records = Some(matcher.merge(records, &report.places));
            }
        }
    }

    info!(
        "Found {} places ({} probes, {} failed)",
        report.places.len(),
        report.probes_searched,
        report.probe_failures.len()
    );

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &report)?;
            writer.flush()?;
            info!("Report written to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &report)?;
            writeln!(writer)?;
        }
    }

    Ok(())
}
