//! Error types shared across the crate.
//!
//! Classification errors ([`ContainmentError`]) are local to a single
//! point/region test and never abort a run. The remaining errors belong to
//! the I/O collaborators and are only fatal where the caller decides so.

use std::path::PathBuf;

/// Failure to classify a point against a region.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContainmentError {
    /// Malformed ring or polygon (too few vertices, no rings).
    #[error("invalid geometry: {0}")]
    Geometry(String),

    /// A geometry variant the classifier does not understand.
    #[error("unsupported geometry type: {0}")]
    UnsupportedGeometry(String),

    /// The point lies outside every known region.
    #[error("no region contains the point")]
    RegionNotFound,
}

/// Errors raised while discovering or reading location history files.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("cannot read history directory {}: {source}", path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed location history: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised while loading boundary polygons.
#[derive(Debug, thiserror::Error)]
pub enum BoundaryError {
    #[error("cannot read boundary file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed boundary file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid GeoJSON: {0}")]
    Format(String),
}

/// Errors raised while writing the visit report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("cannot write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot write CSV record: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors raised by the ingestion pipeline itself.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("sample producer failed: {0}")]
    Producer(String),
}
