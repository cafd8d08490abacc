//! Load, filter and aggregate the dataset for one request.
//!
//! The dataset is re-read for every request so edits to the file show up
//! without a restart.

use std::collections::BTreeMap;
use std::path::Path;

use arrest_map_aggregate::{
    AggregateOptions, BucketCount, BucketError, CoordinateBucket, DatasetStats, Marker,
    apply_threshold, count_buckets, dataset_stats, style_markers, top_n,
};
use arrest_map_geocoder::{
    CacheError, GeocodeCache, RateLimiter, ResolvedLocation, ReverseGeocoder, resolve_locations,
};
use arrest_map_records::{ArrestRecord, RecordsError, filter_valid, load_records};
use thiserror::Error;

/// Errors from running the aggregation pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The dataset could not be loaded.
    #[error(transparent)]
    Records(#[from] RecordsError),

    /// Coordinates could not be bucketed.
    #[error(transparent)]
    Bucket(#[from] BucketError),

    /// The geocode cache could not be saved.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The blocking worker running the load was cancelled.
    #[error("Dataset load was cancelled: {0}")]
    Blocking(#[from] actix_web::error::BlockingError),
}

impl PipelineError {
    /// Whether the failure was caused by the caller's parameters rather than
    /// by the server.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Bucket(BucketError::InvalidPrecision { .. }))
    }
}

/// A dataset reduced to its active buckets.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Headline numbers.
    pub stats: DatasetStats,
    /// Buckets at or above the threshold, in bucket order.
    pub active: Vec<BucketCount>,
}

impl Analysis {
    /// Styled markers for the map view.
    #[must_use]
    pub fn markers(&self) -> Vec<Marker> {
        style_markers(&self.active)
    }

    /// The `limit` busiest active buckets.
    #[must_use]
    pub fn top(&self, limit: usize) -> Vec<BucketCount> {
        top_n(&self.active, limit)
    }
}

/// Loads the dataset at `path` and aggregates it.
///
/// # Errors
///
/// Returns [`PipelineError::Bucket`] if the precision is out of range,
/// checked before the file is touched, and [`PipelineError::Records`] if
/// the file cannot be read.
pub fn analyze(path: &Path, options: AggregateOptions) -> Result<Analysis, PipelineError> {
    options.validate()?;
    let records = load_records(path)?;
    analyze_records(&records, options)
}

/// Aggregates already-loaded records.
///
/// # Errors
///
/// Returns [`PipelineError::Bucket`] if the precision is out of range.
pub fn analyze_records(
    records: &[ArrestRecord],
    options: AggregateOptions,
) -> Result<Analysis, PipelineError> {
    let valid = filter_valid(records);
    let dropped = records.len() - valid.len();
    if dropped > 0 {
        log::debug!("Dropped {dropped} records without usable coordinates");
    }

    let counts: BTreeMap<CoordinateBucket, u64> = count_buckets(&valid, options.precision)?;
    let stats = dataset_stats(records.len(), valid.len(), &counts, options.threshold);
    let active = apply_threshold(&counts, options.threshold);

    log::info!(
        "Aggregated {} records into {} buckets, {} active (precision={} threshold={})",
        valid.len(),
        counts.len(),
        active.len(),
        options.precision,
        options.threshold
    );

    Ok(Analysis { stats, active })
}

/// Names the `limit` busiest buckets of `analysis`.
///
/// # Errors
///
/// Returns [`PipelineError::Cache`] if the updated cache cannot be saved.
pub async fn summarize(
    analysis: &Analysis,
    limit: usize,
    cache: &mut GeocodeCache,
    geocoder: &dyn ReverseGeocoder,
    limiter: &dyn RateLimiter,
) -> Result<Vec<ResolvedLocation>, PipelineError> {
    let top = analysis.top(limit);
    Ok(resolve_locations(&top, cache, geocoder, limiter).await?)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;

    use arrest_map_geocoder::{NoDelay, OfflineGeocoder, UNKNOWN_PLACE};

    use super::*;

    /// Rows for four locations with 15, 10, 9 and 20 arrests, plus three
    /// rows without usable coordinates.
    pub fn scenario_csv() -> String {
        let mut csv = String::from("ARREST_KEY,Latitude,Longitude\n");
        let mut key = 0;
        for (lat, lon, n) in [
            ("40.7101", "-74.0012", 15),
            ("40.6512", "-73.9498", 10),
            ("40.7499", "-73.9903", 9),
            ("40.8204", "-73.9411", 20),
        ] {
            for _ in 0..n {
                key += 1;
                csv.push_str(&format!("{key},{lat},{lon}\n"));
            }
        }
        csv.push_str("900,0,0\n901,,\n902,0.0,-73.95\n");
        csv
    }

    /// Writes `contents` to a fresh temp directory and returns the file path.
    pub fn write_temp_csv(contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("arrest-map-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("arrests.csv");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn analyze_counts_and_filters() {
        let path = write_temp_csv(&scenario_csv());
        let analysis = analyze(&path, AggregateOptions::default()).unwrap();

        assert_eq!(analysis.stats.total_records, 57);
        assert_eq!(analysis.stats.valid_records, 54);
        assert_eq!(analysis.stats.active_buckets, 3);
        assert_eq!(analysis.stats.max_bucket_count, Some(20));

        let counts: Vec<u64> = analysis.active.iter().map(|b| b.count).collect();
        assert_eq!(counts.iter().sum::<u64>(), 45);
        assert!(!counts.contains(&9));

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn markers_span_full_radius_range() {
        let path = write_temp_csv(&scenario_csv());
        let analysis = analyze(&path, AggregateOptions::default()).unwrap();
        let markers = analysis.markers();

        let busiest = markers.iter().find(|m| m.count == 20).unwrap();
        let quietest = markers.iter().find(|m| m.count == 10).unwrap();
        assert!((busiest.radius - 12.0).abs() < f64::EPSILON);
        assert!((quietest.radius - 4.0).abs() < f64::EPSILON);

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn missing_dataset_is_records_error() {
        let err = analyze(Path::new("/nonexistent/arrests.csv"), AggregateOptions::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Records(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn bad_precision_rejected_before_loading() {
        let options = AggregateOptions {
            precision: 7,
            threshold: 1,
        };
        let err = analyze(Path::new("/nonexistent/arrests.csv"), options).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn bad_precision_is_client_error() {
        let records = vec![ArrestRecord::new(40.71, -74.0)];
        let err = analyze_records(
            &records,
            AggregateOptions {
                precision: 9,
                threshold: 1,
            },
        )
        .unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn empty_dataset_has_no_active_buckets() {
        let analysis = analyze_records(&[], AggregateOptions::default()).unwrap();
        assert_eq!(analysis.stats.total_records, 0);
        assert_eq!(analysis.stats.max_bucket_count, None);
        assert!(analysis.markers().is_empty());
    }

    #[actix_web::test]
    async fn summarize_ranks_busiest_first_offline() {
        let path = write_temp_csv(&scenario_csv());
        let analysis = analyze(&path, AggregateOptions::default()).unwrap();
        let mut cache = GeocodeCache::empty(path.with_file_name("geocache.json"));

        let locations = summarize(&analysis, 2, &mut cache, &OfflineGeocoder, &NoDelay)
            .await
            .unwrap();

        let counts: Vec<u64> = locations.iter().map(|l| l.count).collect();
        assert_eq!(counts, vec![20, 15]);
        assert!(locations.iter().all(|l| l.place == UNKNOWN_PLACE));
        assert_eq!(cache.len(), 2);

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
