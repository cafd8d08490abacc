#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation pipeline for arrest coordinates.
//!
//! Pure functions over already-filtered records:
//!
//! 1. [`aggregate`] rounds coordinates into buckets, counts them, and keeps
//!    buckets at or above the activity threshold.
//! 2. [`normalize`] min-max scales the surviving counts into `[0, 1]`, and
//!    [`style_markers`] turns those intensities into marker radii and colors.
//! 3. [`rank::top_n`] orders buckets busiest-first with a deterministic
//!    tie-break.
//! 4. [`stats::dataset_stats`] summarizes a dataset for the summary view.
//!
//! Nothing here holds shared state; every function can run on any thread.

pub mod aggregate;
pub mod normalize;
pub mod rank;
pub mod stats;

pub use aggregate::{
    AggregateOptions, DEFAULT_ACTIVITY_THRESHOLD, DEFAULT_PRECISION, aggregate, apply_threshold,
    count_buckets,
};
pub use arrest_map_records_models::{BucketCount, BucketError, CoordinateBucket};
pub use normalize::{
    HIGH_COLOR, LOW_COLOR, MAX_RADIUS, MIN_RADIUS, Marker, NormalizedBucket, RADIUS_SCALE,
    UNIFORM_INTENSITY, marker_color, marker_radius, normalize, style_markers,
};
pub use rank::{DEFAULT_TOP_LOCATIONS, top_n};
pub use stats::{DatasetStats, dataset_stats};
