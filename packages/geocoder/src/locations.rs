//! Names for the summary view's ranked locations.

use arrest_map_records_models::{BucketCount, CoordinateBucket};

use crate::cache::{CacheError, GeocodeCache};
use crate::rate_limit::RateLimiter;
use crate::ReverseGeocoder;

/// A ranked bucket with its resolved place name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    /// The rounded coordinate.
    pub bucket: CoordinateBucket,
    /// Number of records in the bucket.
    pub count: u64,
    /// Place name, or [`crate::UNKNOWN_PLACE`].
    pub place: String,
}

/// Resolves every entry of `ranked`, in order, then saves the cache if it
/// changed.
///
/// Lookups run one after another. Geocoder failures never abort the batch.
///
/// # Errors
///
/// Returns [`CacheError`] only if the updated cache cannot be written.
pub async fn resolve_locations(
    ranked: &[BucketCount],
    cache: &mut GeocodeCache,
    geocoder: &dyn ReverseGeocoder,
    limiter: &dyn RateLimiter,
) -> Result<Vec<ResolvedLocation>, CacheError> {
    let mut resolved = Vec::with_capacity(ranked.len());

    for entry in ranked {
        let place = cache.lookup(&entry.bucket, geocoder, limiter).await;
        resolved.push(ResolvedLocation {
            bucket: entry.bucket,
            count: entry.count,
            place,
        });
    }

    cache.save_if_dirty()?;

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::NoDelay;
    use crate::test_support::{CountingGeocoder, temp_cache_path};
    use crate::UNKNOWN_PLACE;

    fn ranked() -> Vec<BucketCount> {
        [(40.82, -73.94, 20), (40.71, -74.00, 15), (40.65, -73.95, 10)]
            .into_iter()
            .map(|(lat, lon, count)| {
                BucketCount::new(CoordinateBucket::new(lat, lon, 2).unwrap(), count)
            })
            .collect()
    }

    #[tokio::test]
    async fn keeps_rank_order_and_counts() {
        let path = temp_cache_path();
        let geocoder = CountingGeocoder::with_component("neighbourhood", "Harlem");
        let mut cache = GeocodeCache::empty(&path);

        let resolved = resolve_locations(&ranked(), &mut cache, &geocoder, &NoDelay)
            .await
            .unwrap();

        let counts: Vec<u64> = resolved.iter().map(|r| r.count).collect();
        assert_eq!(counts, vec![20, 15, 10]);
        assert!(resolved.iter().all(|r| r.place == "Harlem"));
        assert_eq!(geocoder.calls(), 3);

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn writes_cache_after_batch() {
        let path = temp_cache_path();
        let geocoder = CountingGeocoder::with_component("suburb", "Manhattan");
        let mut cache = GeocodeCache::empty(&path);

        resolve_locations(&ranked(), &mut cache, &geocoder, &NoDelay)
            .await
            .unwrap();

        assert!(path.exists());
        assert!(!cache.is_dirty());
        assert_eq!(GeocodeCache::load(&path).unwrap().len(), 3);

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn completes_when_geocoder_is_down() {
        let path = temp_cache_path();
        let geocoder = CountingGeocoder::timing_out();
        let mut cache = GeocodeCache::empty(&path);

        let resolved = resolve_locations(&ranked(), &mut cache, &geocoder, &NoDelay)
            .await
            .unwrap();

        assert_eq!(resolved.len(), 3);
        assert!(resolved.iter().all(|r| r.place == UNKNOWN_PLACE));

        // A second summary must not hit the geocoder again.
        resolve_locations(&ranked(), &mut cache, &geocoder, &NoDelay)
            .await
            .unwrap();
        assert_eq!(geocoder.calls(), 3);

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn empty_ranking_touches_nothing() {
        let path = temp_cache_path();
        let geocoder = CountingGeocoder::no_match();
        let mut cache = GeocodeCache::empty(&path);

        let resolved = resolve_locations(&[], &mut cache, &geocoder, &NoDelay)
            .await
            .unwrap();

        assert!(resolved.is_empty());
        assert_eq!(geocoder.calls(), 0);
        assert!(!path.exists());
    }
}
