//! Run configuration.
//!
//! Every field has a default, so a config file only needs to list what it
//! changes:
//!
//! ```json
//! { "history_dir": "takeout/Semantic Location History", "match_policy": "first-match" }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::boundaries::DEFAULT_NAME_PROPERTY;
use crate::pipeline::{PipelineConfig, DEFAULT_CHANNEL_CAPACITY};
use crate::region::MatchPolicy;
use crate::visits::VisitEndPolicy;

/// Configuration for a full timeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Directory searched recursively for monthly history files.
    /// Default: ./data/history/
    pub history_dir: PathBuf,

    /// GeoJSON FeatureCollection with the country boundaries.
    /// Default: ./data/countries.geojson
    pub boundaries_path: PathBuf,

    /// Where the CSV report is written.
    /// Default: ./data/out/history.csv
    pub output_path: PathBuf,

    /// Feature property holding the country name.
    /// Default: "ADMIN" (Natural Earth)
    pub name_property: String,

    /// Samples buffered between the file reader and the classifier.
    /// Default: 500
    pub channel_capacity: usize,

    /// Which region wins if boundaries overlap.
    /// Default: last match in scan order
    pub match_policy: MatchPolicy,

    /// Whether a visit's end follows the latest sample of its run.
    /// Default: end of the visit's first sample
    pub visit_end_policy: VisitEndPolicy,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            history_dir: PathBuf::from("./data/history/"),
            boundaries_path: PathBuf::from("./data/countries.geojson"),
            output_path: PathBuf::from("./data/out/history.csv"),
            name_property: DEFAULT_NAME_PROPERTY.to_string(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            match_policy: MatchPolicy::default(),
            visit_end_policy: VisitEndPolicy::default(),
        }
    }
}

impl TimelineConfig {
    /// Load a JSON config file; missing fields keep their defaults.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let content = std::fs::read(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_slice(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            channel_capacity: self.channel_capacity,
            end_policy: self.visit_end_policy,
        }
    }
}
