#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Arrest dataset loading and coordinate filtering.
//!
//! Reads the arrest CSV export into [`ArrestRecord`]s and drops records whose
//! coordinates are the dataset's "unknown" sentinel (exact zero) or could
//! not be parsed at all.

pub mod dataset;
pub mod filter;

pub use arrest_map_records_models::ArrestRecord;
pub use dataset::{LATITUDE_COLUMN, LONGITUDE_COLUMN, load_records, read_records};
pub use filter::{count_invalid, filter_valid, is_valid_coordinate};

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading the arrest dataset.
#[derive(Debug, Error)]
pub enum RecordsError {
    /// The dataset file could not be opened or read.
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The dataset is not valid CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header row.
    #[error("Dataset is missing required column '{column}'")]
    MissingColumn {
        /// Name of the missing column.
        column: String,
    },
}
