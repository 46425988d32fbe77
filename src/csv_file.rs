//! ROI file: a flat CSV mirror of one layer.
//!
//! One header row `Name,X,Y,W,H`, then one row per ROI in collection order.
//! Coordinates are written under the layer's origin convention at the time
//! of writing; the file itself does not record which convention was used.

#[cfg(test)]
#[path = "csv_file_test.rs"]
mod csv_file_test;

use std::fs::File;
use std::io;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::consts::CSV_HEADERS;
use crate::roi::{Roi, RoiRead};

#[derive(Debug, thiserror::Error)]
pub enum RoiFileError {
    #[error("ROI file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("ROI file is malformed: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: width and height must be positive")]
    InvalidSize { line: u64 },
}

/// One data row as it appears in the file. The name is kept verbatim;
/// numbers may carry surrounding whitespace.
#[derive(Debug, Deserialize)]
struct RoiRecord {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "X", deserialize_with = "trimmed_number")]
    x: f64,
    #[serde(rename = "Y", deserialize_with = "trimmed_number")]
    y: f64,
    #[serde(rename = "W", deserialize_with = "trimmed_number")]
    w: f64,
    #[serde(rename = "H", deserialize_with = "trimmed_number")]
    h: f64,
}

fn trimmed_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let field = String::deserialize(deserializer)?;
    field
        .trim()
        .parse()
        .map_err(|e| serde::de::Error::custom(format!("{field:?} is not a number: {e}")))
}

// =============================================================================
// WRITE
// =============================================================================

/// Create or truncate `path` and write `rois` to it.
///
/// # Errors
///
/// Returns [`RoiFileError`] if the file cannot be created or written.
pub fn write<R: RoiRead>(path: &Path, rois: impl IntoIterator<Item = R>) -> Result<usize, RoiFileError> {
    let file = File::create(path)?;
    write_to(file, rois)
}

/// Write the header and one row per ROI. Returns the number of rows written.
///
/// # Errors
///
/// Returns [`RoiFileError`] on any write failure.
pub fn write_to<W: io::Write, R: RoiRead>(
    writer: W,
    rois: impl IntoIterator<Item = R>,
) -> Result<usize, RoiFileError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(CSV_HEADERS)?;
    let mut count = 0;
    for roi in rois {
        out.write_record([
            roi.name(),
            roi.x().to_string(),
            roi.y().to_string(),
            roi.width().to_string(),
            roi.height().to_string(),
        ])?;
        count += 1;
    }
    out.flush()?;
    Ok(count)
}

// =============================================================================
// READ
// =============================================================================

/// Read every ROI from `path`.
///
/// # Errors
///
/// Returns [`RoiFileError::Io`] if the file cannot be opened,
/// [`RoiFileError::Csv`] for a malformed row or unparseable number, and
/// [`RoiFileError::InvalidSize`] for a row with a non-positive width or height.
pub fn read(path: &Path) -> Result<Vec<Roi>, RoiFileError> {
    let file = File::open(path)?;
    read_from(file)
}

/// Read every ROI from `reader`. Whitespace around header names and numbers
/// is ignored; names are taken exactly as written.
///
/// # Errors
///
/// Same as [`read`], minus the open failure.
pub fn read_from<R: io::Read>(reader: R) -> Result<Vec<Roi>, RoiFileError> {
    let mut input = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    let headers = input.headers()?.clone();
    let mut rois = Vec::new();
    for result in input.records() {
        let record = result?;
        let row: RoiRecord = record.deserialize(Some(&headers))?;
        if row.w > 0.0 && row.h > 0.0 {
            rois.push(Roi::new(row.name, row.x, row.y, row.w, row.h));
        } else {
            let line = record.position().map_or(0, csv::Position::line);
            return Err(RoiFileError::InvalidSize { line });
        }
    }
    Ok(rois)
}

/// Whether `path` names an existing, non-empty file worth offering to load.
#[must_use]
pub fn has_content(path: &Path) -> bool {
    std::fs::metadata(path).is_ok_and(|m| m.is_file() && m.len() > 0)
}
