//! Coordinate bucketing and activity thresholding.

use std::collections::BTreeMap;

use arrest_map_records_models::{ArrestRecord, BucketCount, BucketError, CoordinateBucket};

/// Default rounding precision (decimal places). Two places is roughly a
/// 1 km cell at New York's latitude.
pub const DEFAULT_PRECISION: u8 = 2;

/// Default minimum count for a bucket to count as active.
pub const DEFAULT_ACTIVITY_THRESHOLD: u64 = 10;

/// Rounding precision and activity threshold for one aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Decimal places to round coordinates to.
    pub precision: u8,
    /// Minimum bucket count to keep.
    pub threshold: u64,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            threshold: DEFAULT_ACTIVITY_THRESHOLD,
        }
    }
}

impl AggregateOptions {
    /// Checks the options before any data is read.
    ///
    /// # Errors
    ///
    /// Returns [`BucketError::InvalidPrecision`] if the precision is out of
    /// range.
    pub fn validate(&self) -> Result<(), BucketError> {
        check_precision(self.precision)
    }
}

fn check_precision(precision: u8) -> Result<(), BucketError> {
    CoordinateBucket::new(0.0, 0.0, precision).map(|_| ())
}

/// Counts records per rounded coordinate, before thresholding.
///
/// Expects records that already passed the coordinate filter. The counts
/// always sum to `records.len()`.
///
/// # Errors
///
/// Returns [`BucketError`] if `precision` is out of range or a record has a
/// non-finite coordinate.
pub fn count_buckets(
    records: &[ArrestRecord],
    precision: u8,
) -> Result<BTreeMap<CoordinateBucket, u64>, BucketError> {
    // An empty input must still reject a bad precision.
    check_precision(precision)?;

    let mut counts: BTreeMap<CoordinateBucket, u64> = BTreeMap::new();
    for record in records {
        let bucket = CoordinateBucket::from_record(record, precision)?;
        *counts.entry(bucket).or_default() += 1;
    }

    log::debug!(
        "Bucketed {} records into {} buckets at precision {precision}",
        records.len(),
        counts.len()
    );

    Ok(counts)
}

/// Keeps buckets whose count is at least `threshold`, in bucket order.
#[must_use]
pub fn apply_threshold(counts: &BTreeMap<CoordinateBucket, u64>, threshold: u64) -> Vec<BucketCount> {
    counts
        .iter()
        .filter(|(_, count)| **count >= threshold)
        .map(|(bucket, count)| BucketCount::new(*bucket, *count))
        .collect()
}

/// Buckets, counts and thresholds `records` in one step.
///
/// # Errors
///
/// See [`count_buckets`].
pub fn aggregate(
    records: &[ArrestRecord],
    options: AggregateOptions,
) -> Result<Vec<BucketCount>, BucketError> {
    let counts = count_buckets(records, options.precision)?;
    let active = apply_threshold(&counts, options.threshold);
    log::debug!(
        "{} of {} buckets have at least {} records",
        active.len(),
        counts.len(),
        options.threshold
    );
    Ok(active)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds `count` identical records at `(lat, lon)`.
    pub(crate) fn repeat(lat: f64, lon: f64, count: usize) -> Vec<ArrestRecord> {
        vec![ArrestRecord::new(lat, lon); count]
    }

    /// Four well-separated buckets with counts A=15, B=10, C=9, D=20.
    pub(crate) fn scenario() -> Vec<ArrestRecord> {
        let mut records = Vec::new();
        records.extend(repeat(40.71, -74.00, 15)); // A
        records.extend(repeat(40.65, -73.95, 10)); // B
        records.extend(repeat(40.75, -73.99, 9)); // C
        records.extend(repeat(40.82, -73.94, 20)); // D
        records
    }

    fn bucket(lat: f64, lon: f64) -> CoordinateBucket {
        CoordinateBucket::new(lat, lon, DEFAULT_PRECISION).unwrap()
    }

    #[test]
    fn groups_nearby_records() {
        let records = vec![
            ArrestRecord::new(40.7101, -73.9899),
            ArrestRecord::new(40.7149, -73.9851),
            ArrestRecord::new(40.7200, -73.9900),
        ];
        let counts = count_buckets(&records, 2).unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[&bucket(40.71, -73.99)], 2);
        assert_eq!(counts[&bucket(40.72, -73.99)], 1);
    }

    #[test]
    fn counts_sum_to_record_count() {
        let records = scenario();
        let counts = count_buckets(&records, 2).unwrap();
        assert_eq!(counts.values().sum::<u64>(), records.len() as u64);
        assert!(counts.values().all(|c| *c >= 1));
    }

    #[test]
    fn precision_changes_grouping() {
        let records = vec![
            ArrestRecord::new(40.7101, -73.9899),
            ArrestRecord::new(40.7149, -73.9851),
        ];
        assert_eq!(count_buckets(&records, 2).unwrap().len(), 1);
        assert_eq!(count_buckets(&records, 3).unwrap().len(), 2);
    }

    #[test]
    fn threshold_drops_quiet_buckets() {
        let active = aggregate(&scenario(), AggregateOptions::default()).unwrap();
        let mut counts: Vec<u64> = active.iter().map(|b| b.count).collect();
        counts.sort_unstable();
        assert_eq!(counts, vec![10, 15, 20]);
        assert!(active.iter().all(|b| b.count >= DEFAULT_ACTIVITY_THRESHOLD));
    }

    #[test]
    fn threshold_is_inclusive() {
        let counts = count_buckets(&repeat(40.71, -74.00, 10), 2).unwrap();
        assert_eq!(apply_threshold(&counts, 10).len(), 1);
        assert!(apply_threshold(&counts, 11).is_empty());
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(count_buckets(&[], 2).unwrap().is_empty());
        assert!(aggregate(&[], AggregateOptions::default()).unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_precision_even_when_empty() {
        assert!(matches!(
            count_buckets(&[], 9),
            Err(BucketError::InvalidPrecision { precision: 9 })
        ));
    }

    #[test]
    fn rejects_unfiltered_nan() {
        let records = vec![ArrestRecord::new(f64::NAN, -74.0)];
        assert!(matches!(
            count_buckets(&records, 2),
            Err(BucketError::NonFinite { .. })
        ));
    }
}
