//! Location history reader.
//!
//! Reads the monthly "Semantic Location History" JSON files of a Google
//! Takeout export and yields their place visits as [`Sample`]s.
//!
//! Files are named after the month they cover (`2022_FEBRUARY.json`), so
//! they are ordered by replacing month names with their numbers and sorting
//! the resulting names. Within a file, visits keep their on-file order.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Deserialize;
use walkdir::WalkDir;

use crate::error::HistoryError;
use crate::{LatLngE7, Sample};

const MONTHS: [(&str, &str); 12] = [
    ("JANUARY", "01"),
    ("FEBRUARY", "02"),
    ("MARCH", "03"),
    ("APRIL", "04"),
    ("MAY", "05"),
    ("JUNE", "06"),
    ("JULY", "07"),
    ("AUGUST", "08"),
    ("SEPTEMBER", "09"),
    ("OCTOBER", "10"),
    ("NOVEMBER", "11"),
    ("DECEMBER", "12"),
];

// ============================================================================
// File format
// ============================================================================

#[derive(Debug, Deserialize)]
struct Timeline {
    #[serde(rename = "timelineObjects", default)]
    timeline_objects: Vec<TimelineObject>,
}

#[derive(Debug, Deserialize)]
struct TimelineObject {
    /// Absent for activity segments
    #[serde(rename = "placeVisit")]
    place_visit: Option<PlaceVisit>,
}

#[derive(Debug, Deserialize)]
struct PlaceVisit {
    location: Option<PlaceLocation>,
    duration: Option<PlaceDuration>,
}

#[derive(Debug, Deserialize)]
struct PlaceLocation {
    #[serde(rename = "latitudeE7", default)]
    latitude_e7: i64,
    #[serde(rename = "longitudeE7", default)]
    longitude_e7: i64,
    #[serde(default)]
    name: Option<String>,
}

/// RFC 3339 timestamps in current exports, epoch milliseconds in older ones.
/// Either way the instant is kept in UTC; the timestamp's own offset is dropped.
#[derive(Debug, Deserialize)]
struct PlaceDuration {
    #[serde(rename = "startTimestamp")]
    start: Option<DateTime<Utc>>,
    #[serde(rename = "endTimestamp")]
    end: Option<DateTime<Utc>>,
    #[serde(rename = "startTimestampMs")]
    start_ms: Option<String>,
    #[serde(rename = "endTimestampMs")]
    end_ms: Option<String>,
}

impl PlaceDuration {
    fn interval(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self.start.or_else(|| parse_millis(self.start_ms.as_deref()))?;
        let end = self.end.or_else(|| parse_millis(self.end_ms.as_deref()))?;
        Some((start, end))
    }
}

fn parse_millis(value: Option<&str>) -> Option<DateTime<Utc>> {
    let millis = value?.trim().parse::<i64>().ok()?;
    DateTime::from_timestamp_millis(millis)
}

/// Parse one history file into samples, in file order.
///
/// Timeline objects that are not place visits, visits without a longitude
/// ("no location reported") and visits without a usable time interval are
/// skipped.
pub fn parse_timeline(content: &[u8]) -> Result<Vec<Sample>, HistoryError> {
    let timeline: Timeline = serde_json::from_slice(content)?;

    let samples = timeline
        .timeline_objects
        .into_iter()
        .filter_map(|object| object.place_visit)
        .filter_map(|visit| {
            let location = visit.location?;
            if location.longitude_e7 == 0 {
                return None;
            }
            let Some((start, end)) = visit.duration.as_ref().and_then(PlaceDuration::interval) else {
                debug!(
                    "[History] Skipping visit without time interval: {}",
                    location.name.as_deref().unwrap_or("<unnamed>")
                );
                return None;
            };
            Some(Sample::new(
                LatLngE7::new(location.latitude_e7, location.longitude_e7),
                start,
                end,
            ))
        })
        .collect();

    Ok(samples)
}

// ============================================================================
// Discovery
// ============================================================================

/// A history file and the key that orders it chronologically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryFile {
    pub path: PathBuf,
    pub sort_key: String,
}

/// Replace English month names with their two-digit numbers.
///
/// ```
/// use country_timeline::history::chronological_key;
/// assert_eq!(chronological_key("2022_FEBRUARY.json"), "2022_02.json");
/// ```
pub fn chronological_key(file_name: &str) -> String {
    MONTHS
        .iter()
        .fold(file_name.to_string(), |name, &(month, number)| name.replace(month, number))
}

/// Find every `*.json` file below `dir`, in chronological order.
///
/// Fails only if `dir` itself cannot be read; unreadable entries below it
/// are logged and skipped.
pub fn discover_history_files(dir: &Path) -> Result<Vec<HistoryFile>, HistoryError> {
    std::fs::read_dir(dir).map_err(|source| HistoryError::Discovery {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("[History] Skipping unreadable entry: {}", e);
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type().is_file() && name.ends_with(".json") {
            files.push(HistoryFile {
                sort_key: chronological_key(&name),
                path: entry.into_path(),
            });
        }
    }

    files.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
    info!("[History] Found {} history files in {}", files.len(), dir.display());
    Ok(files)
}

/// Read and parse a single history file.
pub fn read_history_file(path: &Path) -> Result<Vec<Sample>, HistoryError> {
    let content = std::fs::read(path).map_err(|source| HistoryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_timeline(&content)
}

// ============================================================================
// Reader
// ============================================================================

/// Ordered set of history files, read lazily one file at a time.
#[derive(Debug, Clone)]
pub struct HistoryReader {
    files: Vec<HistoryFile>,
}

impl HistoryReader {
    /// Discover the history files below `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, HistoryError> {
        Ok(Self::from_files(discover_history_files(dir.as_ref())?))
    }

    pub fn from_files(files: Vec<HistoryFile>) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &[HistoryFile] {
        &self.files
    }

    /// All samples of all files, file by file in chronological order.
    ///
    /// A file that cannot be read or parsed is logged and skipped.
    pub fn samples(self) -> impl Iterator<Item = Sample> + Send + 'static {
        self.files.into_iter().flat_map(|file| {
            info!("[History] Reading {}", file.path.display());
            read_history_file(&file.path).unwrap_or_else(|e| {
                warn!("[History] {}", e);
                Vec::new()
            })
        })
    }
}
