//! CSV dataset reader.
//!
//! The arrest export has many columns; only [`LATITUDE_COLUMN`] and
//! [`LONGITUDE_COLUMN`] are read. Header names are trimmed and matched
//! exactly. Cells that are empty or not valid floats become `NaN` so the
//! coordinate filter treats them as invalid.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use arrest_map_records_models::ArrestRecord;

use crate::RecordsError;

/// Header of the latitude column.
pub const LATITUDE_COLUMN: &str = "Latitude";

/// Header of the longitude column.
pub const LONGITUDE_COLUMN: &str = "Longitude";

/// Loads every record from the dataset at `path`.
///
/// Files ending in `.tsv` are read tab-delimited, everything else
/// comma-delimited.
///
/// # Errors
///
/// Returns [`RecordsError::Io`] if the file cannot be opened,
/// [`RecordsError::Csv`] if it is not valid CSV, or
/// [`RecordsError::MissingColumn`] if either coordinate column is absent.
pub fn load_records(path: &Path) -> Result<Vec<ArrestRecord>, RecordsError> {
    let file = File::open(path).map_err(|source| RecordsError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let records = read_records(BufReader::new(file), delimiter_for(path))?;
    log::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Reads records from any delimited source.
///
/// # Errors
///
/// Returns [`RecordsError::Csv`] on malformed input or
/// [`RecordsError::MissingColumn`] if either coordinate column is absent.
pub fn read_records<R: Read>(reader: R, delimiter: u8) -> Result<Vec<ArrestRecord>, RecordsError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();

    let lat_idx = column_index(&headers, LATITUDE_COLUMN)?;
    let lon_idx = column_index(&headers, LONGITUDE_COLUMN)?;

    let mut records = Vec::new();
    let mut unparsed = 0usize;

    for row in reader.records() {
        let row = row?;
        let latitude = parse_coordinate(row.get(lat_idx));
        let longitude = parse_coordinate(row.get(lon_idx));
        if latitude.is_nan() || longitude.is_nan() {
            unparsed += 1;
        }
        records.push(ArrestRecord::new(latitude, longitude));
    }

    if unparsed > 0 {
        log::debug!("{unparsed} rows had missing or unparseable coordinates");
    }

    Ok(records)
}

fn column_index(headers: &[String], column: &str) -> Result<usize, RecordsError> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| RecordsError::MissingColumn {
            column: column.to_owned(),
        })
}

fn parse_coordinate(cell: Option<&str>) -> f64 {
    cell.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    }
}
