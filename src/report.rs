//! CSV report of country visits.
//!
//! ```text
//! Country,Start,End
//! Switzerland,2022-02-01,2022-02-14
//! Italy,2022-02-14,2022-02-20
//! ```
//!
//! Dates are the UTC calendar day of each timestamp. History timestamps
//! carrying another offset are converted to UTC when parsed, so a visit
//! starting shortly after local midnight east of Greenwich reports the
//! previous day.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;

use crate::error::ReportError;
use crate::VisitRecord;

const HEADER: [&str; 3] = ["Country", "Start", "End"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Write `visits` as CSV to `writer`.
///
/// Fields are quoted only where needed (delimiters, quotes, line breaks).
pub fn write_csv<W: Write>(visits: &[VisitRecord], writer: W) -> Result<(), ReportError> {
    let mut out = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    out.write_record(HEADER)?;
    for visit in visits {
        let start = visit.start.format(DATE_FORMAT).to_string();
        let end = visit.end.format(DATE_FORMAT).to_string();
        out.write_record([visit.country.as_str(), start.as_str(), end.as_str()])?;
    }
    out.flush()?;
    Ok(())
}

/// Write `visits` to a CSV file, creating parent directories as needed.
pub fn write_csv_file(visits: &[VisitRecord], path: &Path) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_csv(visits, BufWriter::new(file))?;
    info!("[Report] Wrote {} visits to {}", visits.len(), path.display());
    Ok(())
}
