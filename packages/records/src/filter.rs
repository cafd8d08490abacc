//! Coordinate filter.
//!
//! The dataset encodes an unknown location as exactly `0` on either axis, so
//! the sentinel check is an exact float comparison. `NaN` (an empty or
//! unparseable cell) and infinities are treated as invalid too.

use arrest_map_records_models::ArrestRecord;

/// Returns `true` if both coordinates are usable.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn is_valid_coordinate(record: &ArrestRecord) -> bool {
    record.latitude.is_finite()
        && record.longitude.is_finite()
        && record.latitude != 0.0
        && record.longitude != 0.0
}

/// Returns the records with valid coordinates, preserving order.
#[must_use]
pub fn filter_valid(records: &[ArrestRecord]) -> Vec<ArrestRecord> {
    records
        .iter()
        .filter(|r| is_valid_coordinate(r))
        .copied()
        .collect()
}

/// Counts records rejected by [`is_valid_coordinate`].
#[must_use]
pub fn count_invalid(records: &[ArrestRecord]) -> usize {
    records.iter().filter(|r| !is_valid_coordinate(r)).count()
}
