//! Reader -> classifier pipeline.
//!
//! Reading and parsing history files is slow compared to classifying the
//! samples they contain, so the two run concurrently: one producer on the
//! blocking thread pool pushes samples into a bounded channel, and a single
//! consumer drains it into a [`VisitAggregator`].
//!
//! - The producer blocks while the channel is full.
//! - Samples are aggregated in exactly the order they were produced.
//! - The stream ends when the producer drops its sender; the consumer
//!   finishes once the channel is closed and drained.
//!
//! There is exactly one consumer: the region index reorders itself on
//! every lookup and visit aggregation depends on sample adjacency.

use std::time::Instant;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::PipelineError;
use crate::region::RegionIndex;
use crate::visits::{AggregatorStats, VisitAggregator, VisitEndPolicy};
use crate::{Sample, VisitRecord};

/// Default channel capacity. Disk reads dominate, so a larger buffer does not help.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 500;

/// Configuration for [`run_pipeline`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of samples buffered between reader and classifier.
    /// Default: 500
    pub channel_capacity: usize,

    /// How a running visit's end time is maintained.
    /// Default: end of the visit's first sample
    pub end_policy: VisitEndPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            end_policy: VisitEndPolicy::default(),
        }
    }
}

/// Result of a pipeline run.
#[derive(Debug)]
pub struct PipelineOutput {
    pub visits: Vec<VisitRecord>,
    pub stats: AggregatorStats,
    /// The region index in its final, most-recently-used order
    pub index: RegionIndex,
}

/// Stream `source` through a bounded channel into a visit aggregator.
///
/// `source` is iterated on tokio's blocking pool, so it may perform
/// blocking file I/O. Must be called from within a tokio runtime.
///
/// # Example
/// ```
/// use country_timeline::{run_pipeline, PipelineConfig, RegionIndex};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let output = run_pipeline(Vec::new(), RegionIndex::default(), &PipelineConfig::default())
///     .await
///     .unwrap();
/// assert!(output.visits.is_empty());
/// # });
/// ```
pub async fn run_pipeline<S>(
    source: S,
    index: RegionIndex,
    config: &PipelineConfig,
) -> Result<PipelineOutput, PipelineError>
where
    S: IntoIterator<Item = Sample> + Send + 'static,
{
    let capacity = config.channel_capacity.max(1);
    let (tx, mut rx) = mpsc::channel::<Sample>(capacity);

    info!(
        "[Pipeline] Starting: {} regions, channel capacity {}",
        index.len(),
        capacity
    );
    let start = Instant::now();

    let producer = tokio::task::spawn_blocking(move || {
        let mut sent: u64 = 0;
        for sample in source {
            if tx.blocking_send(sample).is_err() {
                warn!("[Pipeline] Consumer went away after {} samples", sent);
                break;
            }
            sent += 1;
        }
        sent
    });

    let mut aggregator = VisitAggregator::with_end_policy(index, config.end_policy);
    while let Some(sample) = rx.recv().await {
        aggregator.push(&sample);
    }

    let produced = producer
        .await
        .map_err(|e| PipelineError::Producer(e.to_string()))?;

    let (visits, stats, index) = aggregator.into_parts();

    info!(
        "[Pipeline] DONE: {} samples ({} matched, {} dropped) -> {} visits in {:.2}s ({} region tests)",
        produced,
        stats.matched,
        stats.dropped,
        visits.len(),
        start.elapsed().as_secs_f64(),
        index.classifications()
    );

    Ok(PipelineOutput { visits, stats, index })
}
