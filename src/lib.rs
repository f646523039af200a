//! # Country Timeline
//!
//! Turns a location history into a timeline of the countries visited.
//!
//! This library provides:
//! - Planar point-in-polygon classification with holes (winding number)
//! - A self-reordering region index tuned for travel data
//! - Streaming aggregation of location samples into country visits
//! - A bounded reader/classifier pipeline for large histories
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use country_timeline::{
//!     analyze_samples, LatLngE7, Polygon, Region, RegionGeometry, RegionIndex, Ring, Sample,
//! };
//!
//! // One square "country" around the origin
//! let square = Ring::from_xy(&[(-1.0, -1.0), (-1.0, 1.0), (1.0, 1.0), (1.0, -1.0)]);
//! let index = RegionIndex::new(vec![
//!     Region::new("Nullland", RegionGeometry::Polygon(Polygon::new(vec![square]))),
//! ]);
//!
//! let start = Utc.with_ymd_and_hms(2022, 2, 1, 8, 0, 0).unwrap();
//! let end = Utc.with_ymd_and_hms(2022, 2, 1, 18, 0, 0).unwrap();
//! let samples = vec![Sample::new(LatLngE7::new(5_000_000, 2_500_000), start, end)];
//!
//! let (visits, _stats) = analyze_samples(samples, index);
//! assert_eq!(visits[0].country, "Nullland");
//! ```

use chrono::{DateTime, Utc};
use geo::Coord;

pub mod error;
pub use error::{BoundaryError, ContainmentError, HistoryError, PipelineError, ReportError};

// Point / polygon / multi-polygon containment
pub mod geometry;
pub use geometry::{Polygon, RegionGeometry, Ring};

// Move-to-front region lookup
pub mod region;
pub use region::{MatchPolicy, Region, RegionIndex};

// Sample -> visit aggregation
pub mod visits;
pub use visits::{AggregatorState, AggregatorStats, VisitAggregator, VisitEndPolicy};

// Reader -> classifier channel
pub mod pipeline;
pub use pipeline::{run_pipeline, PipelineConfig, PipelineOutput};

// I/O collaborators
pub mod boundaries;
pub mod history;
pub mod report;

pub mod config;
pub use config::TimelineConfig;

// ============================================================================
// Core Types
// ============================================================================

/// Scale of the fixed-point coordinates found in location history files.
pub const E7: f64 = 1e7;

/// A location in fixed-point degrees scaled by 10^7.
///
/// # Example
/// ```
/// use country_timeline::LatLngE7;
/// let zurich = LatLngE7::new(473_769_000, 85_417_000);
/// assert!((zurich.latitude() - 47.3769).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatLngE7 {
    pub latitude_e7: i64,
    pub longitude_e7: i64,
}

impl LatLngE7 {
    pub fn new(latitude_e7: i64, longitude_e7: i64) -> Self {
        Self { latitude_e7, longitude_e7 }
    }

    /// Build from floating degrees, rounding to the nearest fixed-point step.
    pub fn from_degrees(latitude: f64, longitude: f64) -> Self {
        Self::new((latitude * E7).round() as i64, (longitude * E7).round() as i64)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude_e7 as f64 / E7
    }

    pub fn longitude(&self) -> f64 {
        self.longitude_e7 as f64 / E7
    }

    /// Planar coordinate used for classification (`x` = longitude, `y` = latitude).
    pub fn to_coord(&self) -> Coord {
        Coord { x: self.longitude(), y: self.latitude() }
    }
}

/// One location observation covering the interval `[start, end)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub location: LatLngE7,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Sample {
    pub fn new(location: LatLngE7, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { location, start, end }
    }

    pub fn point(&self) -> Coord {
        self.location.to_coord()
    }
}

/// Time spent in one country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitRecord {
    /// Region name, e.g. the country's admin name
    pub country: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl VisitRecord {
    pub fn new(country: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { country: country.into(), start, end }
    }
}

// ============================================================================
// Core Functions
// ============================================================================

/// Aggregate an in-memory sample sequence without the threaded pipeline.
///
/// Samples must be in time order. Samples outside every region are dropped.
pub fn analyze_samples<I>(samples: I, index: RegionIndex) -> (Vec<VisitRecord>, AggregatorStats)
where
    I: IntoIterator<Item = Sample>,
{
    let mut aggregator = VisitAggregator::new(index);
    aggregator.extend(samples);
    aggregator.finish()
}

// ============================================================================
// Tests
// ============================================================================
