//! Top-N bucket selection.

use arrest_map_records_models::BucketCount;

/// Default number of locations in the summary view.
pub const DEFAULT_TOP_LOCATIONS: usize = 10;

/// Returns the `n` busiest buckets, busiest first.
///
/// Equal counts are ordered by bucket (latitude, then longitude, ascending),
/// so the result is the same for any input order.
#[must_use]
pub fn top_n(buckets: &[BucketCount], n: usize) -> Vec<BucketCount> {
    let mut ranked = buckets.to_vec();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.bucket.cmp(&b.bucket)));
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use arrest_map_records_models::CoordinateBucket;

    use super::*;

    fn count(lat: f64, lon: f64, count: u64) -> BucketCount {
        BucketCount::new(CoordinateBucket::new(lat, lon, 2).unwrap(), count)
    }

    fn sample() -> Vec<BucketCount> {
        vec![
            count(40.70, -74.00, 15),
            count(40.65, -73.95, 10),
            count(40.82, -73.94, 20),
            count(40.75, -73.99, 9),
            count(40.60, -73.90, 15),
        ]
    }

    #[test]
    fn sorts_descending_by_count() {
        let top = top_n(&sample(), 10);
        let counts: Vec<u64> = top.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![20, 15, 15, 10, 9]);
    }

    #[test]
    fn breaks_ties_by_bucket() {
        let top = top_n(&sample(), 3);
        assert_eq!(top[1], count(40.60, -73.90, 15));
        assert_eq!(top[2], count(40.70, -74.00, 15));
    }

    #[test]
    fn length_is_min_of_n_and_available() {
        assert_eq!(top_n(&sample(), 2).len(), 2);
        assert_eq!(top_n(&sample(), 5).len(), 5);
        assert_eq!(top_n(&sample(), 50).len(), 5);
        assert!(top_n(&sample(), 0).is_empty());
    }

    #[test]
    fn independent_of_input_order() {
        let mut reversed = sample();
        reversed.reverse();
        assert_eq!(top_n(&sample(), 4), top_n(&reversed, 4));
    }

    #[test]
    fn idempotent() {
        let once = top_n(&sample(), 3);
        assert_eq!(top_n(&sample(), 3), once);
        assert_eq!(top_n(&once, 3), once);
    }

    #[test]
    fn empty_input() {
        assert!(top_n(&[], DEFAULT_TOP_LOCATIONS).is_empty());
    }
}
