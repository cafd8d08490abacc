//! Dataset-level statistics for the summary view.

use std::collections::BTreeMap;

use arrest_map_records_models::CoordinateBucket;

/// Headline numbers for a loaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetStats {
    /// Every row read from the dataset.
    pub total_records: u64,
    /// Rows that passed the coordinate filter.
    pub valid_records: u64,
    /// Buckets with at least the activity threshold of records.
    pub active_buckets: u64,
    /// Largest bucket count before thresholding, if there are any buckets.
    pub max_bucket_count: Option<u64>,
}

/// Summarizes a dataset from its record totals and pre-threshold counts.
#[must_use]
pub fn dataset_stats(
    total_records: usize,
    valid_records: usize,
    counts: &BTreeMap<CoordinateBucket, u64>,
    threshold: u64,
) -> DatasetStats {
    DatasetStats {
        total_records: total_records as u64,
        valid_records: valid_records as u64,
        active_buckets: counts.values().filter(|c| **c >= threshold).count() as u64,
        max_bucket_count: counts.values().max().copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::scenario;
    use crate::count_buckets;

    #[test]
    fn summarizes_reference_scenario() {
        let records = scenario();
        let counts = count_buckets(&records, 2).unwrap();
        let stats = dataset_stats(records.len() + 6, records.len(), &counts, 10);
        assert_eq!(
            stats,
            DatasetStats {
                total_records: 60,
                valid_records: 54,
                active_buckets: 3,
                max_bucket_count: Some(20),
            }
        );
    }

    #[test]
    fn max_ignores_threshold() {
        let records = scenario();
        let counts = count_buckets(&records, 2).unwrap();
        let stats = dataset_stats(records.len(), records.len(), &counts, 100);
        assert_eq!(stats.active_buckets, 0);
        assert_eq!(stats.max_bucket_count, Some(20));
    }

    #[test]
    fn empty_dataset() {
        let stats = dataset_stats(3, 0, &BTreeMap::new(), 10);
        assert_eq!(stats.active_buckets, 0);
        assert_eq!(stats.max_bucket_count, None);
        assert_eq!(stats.total_records, 3);
    }
}
