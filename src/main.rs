//! `country-timeline`: writes a CSV of the countries found in a location history.
//!
//! Run with: cargo run --release -- --history "takeout/Semantic Location History"

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use country_timeline::history::HistoryReader;
use country_timeline::{boundaries, report, run_pipeline, MatchPolicy, RegionIndex, TimelineConfig, VisitEndPolicy};

#[derive(Debug, Parser)]
#[command(name = "country-timeline", version, about = "Timeline of the countries in a location history")]
struct Cli {
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory with the monthly location history files
    #[arg(long)]
    history: Option<PathBuf>,

    /// GeoJSON file with the country boundaries
    #[arg(long)]
    boundaries: Option<PathBuf>,

    /// Output CSV file
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Feature property holding the country name
    #[arg(long)]
    name_property: Option<String>,

    /// Samples buffered between reader and classifier
    #[arg(long)]
    channel_capacity: Option<usize>,

    /// Stop at the first matching region instead of the last
    #[arg(long)]
    first_match: bool,

    /// Extend each visit to the end of its latest sample
    #[arg(long)]
    extend_visits: bool,
}

impl Cli {
    fn resolve(self) -> Result<TimelineConfig> {
        let mut config = match &self.config {
            Some(path) => TimelineConfig::from_file(path)?,
            None => TimelineConfig::default(),
        };

        if let Some(dir) = self.history {
            config.history_dir = dir;
        }
        if let Some(path) = self.boundaries {
            config.boundaries_path = path;
        }
        if let Some(path) = self.output {
            config.output_path = path;
        }
        if let Some(name) = self.name_property {
            config.name_property = name;
        }
        if let Some(capacity) = self.channel_capacity {
            config.channel_capacity = capacity;
        }
        if self.first_match {
            config.match_policy = MatchPolicy::FirstMatch;
        }
        if self.extend_visits {
            config.visit_end_policy = VisitEndPolicy::LastSample;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Cli::parse().resolve()?;

    let regions = boundaries::load_regions(&config.boundaries_path, &config.name_property)
        .context("Error when loading country boundaries")?;
    let index = RegionIndex::with_policy(regions, config.match_policy);

    let reader = HistoryReader::open(&config.history_dir)
        .context("Error when listing location history files")?;

    let output = run_pipeline(reader.samples(), index, &config.pipeline()).await?;
    if output.stats.dropped > 0 {
        warn!(
            "{} of {} samples matched no country and were skipped",
            output.stats.dropped, output.stats.samples
        );
    }

    report::write_csv_file(&output.visits, &config.output_path)
        .with_context(|| format!("Error when writing {}", config.output_path.display()))?;

    info!(
        "{} visits across {} countries",
        output.visits.len(),
        output
            .visits
            .iter()
            .map(|v| v.country.as_str())
            .collect::<std::collections::HashSet<_>>()
            .len()
    );
    Ok(())
}
