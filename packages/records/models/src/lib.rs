#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Arrest record and coordinate bucket types.
//!
//! An [`ArrestRecord`] is a single row of the arrest dataset. Records are
//! grouped into [`CoordinateBucket`]s by rounding their coordinates to a
//! fixed number of decimal places. Buckets store the rounded coordinates as
//! scaled integers so equality, hashing and ordering are exact.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest supported rounding precision (decimal places).
///
/// Six decimal places is roughly 11 cm at the equator, well past the
/// resolution of the source data.
pub const MAX_PRECISION: u8 = 6;

/// A single arrest as read from the dataset.
///
/// Only the coordinates take part in aggregation. Cells that could not be
/// parsed are stored as `NaN` so the coordinate filter can drop them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrestRecord {
    /// Latitude in degrees (WGS84). `0.0` means unknown.
    pub latitude: f64,
    /// Longitude in degrees (WGS84). `0.0` means unknown.
    pub longitude: f64,
}

impl ArrestRecord {
    /// Creates a record from a latitude/longitude pair.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Errors from building a [`CoordinateBucket`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BucketError {
    /// The requested precision is larger than [`MAX_PRECISION`].
    #[error("Invalid bucket precision {precision} (maximum is {MAX_PRECISION})")]
    InvalidPrecision {
        /// The rejected precision.
        precision: u8,
    },

    /// One of the coordinates is NaN or infinite.
    #[error("Coordinate ({latitude}, {longitude}) is not finite")]
    NonFinite {
        /// Latitude as given.
        latitude: f64,
        /// Longitude as given.
        longitude: f64,
    },
}

/// A coordinate rounded to `precision` decimal places.
///
/// The derived ordering is `(precision, latitude, longitude)` ascending. It
/// is used as the deterministic tie-break when ranking buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordinateBucket {
    precision: u8,
    lat_scaled: i64,
    lon_scaled: i64,
}

impl CoordinateBucket {
    /// Rounds a coordinate pair into a bucket.
    ///
    /// Exact ties round to the even neighbour, so `40.125` at two places
    /// becomes `40.12`.
    ///
    /// # Errors
    ///
    /// Returns [`BucketError::InvalidPrecision`] if `precision` exceeds
    /// [`MAX_PRECISION`], or [`BucketError::NonFinite`] if either
    /// coordinate is NaN or infinite.
    pub fn new(latitude: f64, longitude: f64, precision: u8) -> Result<Self, BucketError> {
        if precision > MAX_PRECISION {
            return Err(BucketError::InvalidPrecision { precision });
        }
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(BucketError::NonFinite {
                latitude,
                longitude,
            });
        }

        let scale = scale(precision);
        Ok(Self {
            precision,
            lat_scaled: to_scaled(latitude, scale),
            lon_scaled: to_scaled(longitude, scale),
        })
    }

    /// Buckets a record's coordinates.
    ///
    /// # Errors
    ///
    /// See [`CoordinateBucket::new`].
    pub fn from_record(record: &ArrestRecord, precision: u8) -> Result<Self, BucketError> {
        Self::new(record.latitude, record.longitude, precision)
    }

    /// Number of decimal places the coordinates were rounded to.
    #[must_use]
    pub const fn precision(&self) -> u8 {
        self.precision
    }

    /// Rounded latitude in degrees.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn latitude(&self) -> f64 {
        self.lat_scaled as f64 / scale(self.precision)
    }

    /// Rounded longitude in degrees.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn longitude(&self) -> f64 {
        self.lon_scaled as f64 / scale(self.precision)
    }
}

impl std::fmt::Display for CoordinateBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits = usize::from(self.precision);
        write!(
            f,
            "({:.digits$}, {:.digits$})",
            self.latitude(),
            self.longitude()
        )
    }
}

fn scale(precision: u8) -> f64 {
    10f64.powi(i32::from(precision))
}

#[allow(clippy::cast_possible_truncation)]
fn to_scaled(value: f64, scale: f64) -> i64 {
    (value * scale).round_ties_even() as i64
}

/// Number of records that fell into a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketCount {
    /// The rounded coordinate.
    pub bucket: CoordinateBucket,
    /// Number of records in the bucket (always at least 1).
    pub count: u64,
}

impl BucketCount {
    /// Pairs a bucket with its count.
    #[must_use]
    pub const fn new(bucket: CoordinateBucket, count: u64) -> Self {
        Self { bucket, count }
    }
}
