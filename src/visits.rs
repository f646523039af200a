//! # Visit Aggregation
//!
//! Collapses an ordered stream of location samples into country visits.
//!
//! Each sample is resolved to a region through the [`RegionIndex`]. A run of
//! consecutive samples in the same region produces a single
//! [`VisitRecord`]; when a sample in a different region arrives, the running
//! visit is closed at that sample's start and a new visit begins.
//!
//! Samples outside every region (open ocean, missing boundaries) are dropped
//! without changing the current visit.
//!
//! ## End of a visit
//!
//! With the default [`VisitEndPolicy::FirstSample`], a visit keeps the end
//! time of the sample that opened it until a different country closes it.
//! The last visit of a stream therefore ends at its first sample's end, not
//! its last one. [`VisitEndPolicy::LastSample`] instead advances the end with
//! every sample of the run.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::region::RegionIndex;
use crate::{Sample, VisitRecord};

/// How the end of a running visit is maintained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisitEndPolicy {
    /// Keep the end of the sample that opened the visit.
    #[default]
    FirstSample,
    /// Move the end to the end of the latest sample in the run.
    LastSample,
}

/// Whether the aggregator has opened a visit yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorState {
    Empty,
    Tracking,
}

/// Counters describing an aggregation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregatorStats {
    /// Samples seen
    pub samples: u64,
    /// Samples resolved to a region
    pub matched: u64,
    /// Samples outside every region
    pub dropped: u64,
}

/// Streaming visit builder. Owns the region index it classifies against.
#[derive(Debug)]
pub struct VisitAggregator {
    index: RegionIndex,
    end_policy: VisitEndPolicy,
    visits: Vec<VisitRecord>,
    stats: AggregatorStats,
}

impl VisitAggregator {
    pub fn new(index: RegionIndex) -> Self {
        Self::with_end_policy(index, VisitEndPolicy::default())
    }

    pub fn with_end_policy(index: RegionIndex, end_policy: VisitEndPolicy) -> Self {
        Self {
            index,
            end_policy,
            visits: Vec::new(),
            stats: AggregatorStats::default(),
        }
    }

    /// Classify one sample and fold it into the visit list.
    ///
    /// Returns `false` if the sample matched no region and was dropped.
    pub fn push(&mut self, sample: &Sample) -> bool {
        self.stats.samples += 1;

        let country = match self.index.find_containing(sample.point()) {
            Ok(region) => region.name(),
            Err(e) => {
                debug!(
                    "[VisitAggregator] Dropping sample at {} ({:.5}, {:.5}): {}",
                    sample.start,
                    sample.location.latitude(),
                    sample.location.longitude(),
                    e
                );
                self.stats.dropped += 1;
                return false;
            }
        };
        self.stats.matched += 1;

        match self.visits.last_mut() {
            Some(last) if last.country == country => {
                if self.end_policy == VisitEndPolicy::LastSample {
                    last.end = sample.end;
                }
            }
            Some(last) => {
                last.end = sample.start;
                self.visits.push(VisitRecord::new(country, sample.start, sample.end));
            }
            None => {
                self.visits.push(VisitRecord::new(country, sample.start, sample.end));
            }
        }
        true
    }

    pub fn state(&self) -> AggregatorState {
        if self.visits.is_empty() {
            AggregatorState::Empty
        } else {
            AggregatorState::Tracking
        }
    }

    /// Visits accumulated so far; the last one is still open.
    pub fn visits(&self) -> &[VisitRecord] {
        &self.visits
    }

    pub fn index(&self) -> &RegionIndex {
        &self.index
    }

    pub fn stats(&self) -> AggregatorStats {
        self.stats
    }

    /// Finish the stream and return the visits with the run statistics.
    pub fn finish(self) -> (Vec<VisitRecord>, AggregatorStats) {
        (self.visits, self.stats)
    }

    /// Like [`finish`](Self::finish), also handing back the reordered index.
    pub fn into_parts(self) -> (Vec<VisitRecord>, AggregatorStats, RegionIndex) {
        (self.visits, self.stats, self.index)
    }
}

impl Extend<Sample> for VisitAggregator {
    fn extend<T: IntoIterator<Item = Sample>>(&mut self, iter: T) {
        for sample in iter {
            self.push(&sample);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Polygon, RegionGeometry, Ring};
    use crate::region::Region;
    use crate::LatLngE7;
    use chrono::{DateTime, TimeZone, Utc};

    /// Two neighbouring countries: West covers lng 0..10, East covers lng 10..20 (lat 40..50).
    fn index() -> RegionIndex {
        let band = |name: &str, west: f64, east: f64| {
            Region::new(
                name,
                RegionGeometry::Polygon(Polygon::new(vec![Ring::from_xy(&[
                    (west, 40.0),
                    (west, 50.0),
                    (east, 50.0),
                    (east, 40.0),
                ])])),
            )
        };
        RegionIndex::new(vec![band("West", 0.0, 10.0), band("East", 10.0, 20.0)])
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 3, d, 12, 0, 0).unwrap()
    }

    /// Sample at (45, lng) spanning days `start..end`.
    fn sample(lng: f64, start: u32, end: u32) -> Sample {
        Sample::new(LatLngE7::from_degrees(45.0, lng), day(start), day(end))
    }

    #[test]
    fn test_empty_stream() {
        let aggregator = VisitAggregator::new(index());
        assert_eq!(aggregator.state(), AggregatorState::Empty);
        let (visits, stats) = aggregator.finish();
        assert!(visits.is_empty());
        assert_eq!(stats, AggregatorStats::default());
    }

    #[test]
    fn test_first_sample_opens_visit() {
        let mut aggregator = VisitAggregator::new(index());
        assert!(aggregator.push(&sample(5.0, 1, 2)));
        assert_eq!(aggregator.state(), AggregatorState::Tracking);
        assert_eq!(aggregator.visits(), &[VisitRecord::new("West", day(1), day(2))]);
    }

    #[test]
    fn test_run_collapses_into_one_visit() {
        let mut aggregator = VisitAggregator::new(index());
        aggregator.extend((1..=5).map(|d| sample(5.0, d, d + 1)));

        let (visits, stats) = aggregator.finish();
        // The trailing visit keeps the end of its first sample
        assert_eq!(visits, vec![VisitRecord::new("West", day(1), day(2))]);
        assert_eq!(stats.matched, 5);
    }

    #[test]
    fn test_known_timeline() {
        let samples = vec![
            sample(5.0, 1, 2),   // West
            sample(6.0, 3, 4),   // West
            sample(15.0, 5, 6),  // East: closes West at day 5
            sample(-30.0, 7, 8), // ocean, dropped
            sample(16.0, 9, 10), // East
            sample(4.0, 11, 12), // West: closes East at day 11
            sample(3.0, 13, 14), // West
        ];

        let mut aggregator = VisitAggregator::new(index());
        aggregator.extend(samples);
        let (visits, stats) = aggregator.finish();

        assert_eq!(
            visits,
            vec![
                VisitRecord::new("West", day(1), day(5)),
                VisitRecord::new("East", day(5), day(11)),
                VisitRecord::new("West", day(11), day(12)),
            ]
        );
        assert_eq!(stats, AggregatorStats { samples: 7, matched: 6, dropped: 1 });
    }

    #[test]
    fn test_dropped_sample_does_not_split_run() {
        let mut aggregator = VisitAggregator::new(index());
        assert!(aggregator.push(&sample(5.0, 1, 2)));
        assert!(!aggregator.push(&sample(50.0, 3, 4)));
        assert!(aggregator.push(&sample(6.0, 5, 6)));
        assert_eq!(aggregator.visits().len(), 1);
    }

    #[test]
    fn test_unmatched_first_sample_stays_empty() {
        let mut aggregator = VisitAggregator::new(index());
        assert!(!aggregator.push(&sample(-30.0, 1, 2)));
        assert_eq!(aggregator.state(), AggregatorState::Empty);
    }

    #[test]
    fn test_last_sample_policy_extends_visits() {
        let mut aggregator = VisitAggregator::with_end_policy(index(), VisitEndPolicy::LastSample);
        aggregator.extend(vec![
            sample(5.0, 1, 2),
            sample(6.0, 3, 4),
            sample(15.0, 5, 6),
            sample(16.0, 7, 8),
        ]);

        assert_eq!(
            aggregator.visits(),
            &[
                VisitRecord::new("West", day(1), day(5)),
                VisitRecord::new("East", day(5), day(8)),
            ]
        );
    }

    #[test]
    fn test_index_follows_current_country() {
        let mut aggregator = VisitAggregator::new(index());
        aggregator.push(&sample(15.0, 1, 2));
        assert_eq!(aggregator.index().names().next(), Some("East"));
        aggregator.push(&sample(5.0, 3, 4));
        assert_eq!(aggregator.index().names().next(), Some("West"));
    }
}
