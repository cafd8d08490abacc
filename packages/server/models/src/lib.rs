#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the arrest map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the aggregation types to allow independent evolution of the API
//! contract.

use arrest_map_aggregate::{DatasetStats, HIGH_COLOR, LOW_COLOR, Marker};
use arrest_map_geocoder::ResolvedLocation;
use serde::{Deserialize, Serialize};

/// Default map center (New York City).
pub const DEFAULT_CENTER: ApiMapCenter = ApiMapCenter {
    latitude: 40.7128,
    longitude: -74.0060,
    zoom: 10,
};

/// Query parameters shared by the map and data endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateQueryParams {
    /// Rounding precision in decimal places (overrides server default).
    pub precision: Option<u8>,
    /// Activity threshold (overrides server default).
    pub threshold: Option<u64>,
}

/// Query parameters for the summary endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQueryParams {
    /// Rounding precision in decimal places (overrides server default).
    pub precision: Option<u8>,
    /// Activity threshold (overrides server default).
    pub threshold: Option<u64>,
    /// Number of top locations to return (overrides server default).
    pub limit: Option<usize>,
}

/// A circle marker for the map view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMarker {
    /// Rounded latitude.
    pub latitude: f64,
    /// Rounded longitude.
    pub longitude: f64,
    /// Arrests in the bucket.
    pub count: u64,
    /// Count scaled into `[0, 1]`.
    pub intensity: f64,
    /// Circle radius in pixels.
    pub radius: f64,
    /// `#rrggbb` color.
    pub color: String,
}

impl From<Marker> for ApiMarker {
    fn from(marker: Marker) -> Self {
        Self {
            latitude: marker.bucket.latitude(),
            longitude: marker.bucket.longitude(),
            count: marker.count,
            intensity: marker.intensity,
            radius: marker.radius,
            color: marker.color,
        }
    }
}

/// Initial map viewport.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMapCenter {
    /// Center latitude.
    pub latitude: f64,
    /// Center longitude.
    pub longitude: f64,
    /// Initial zoom level.
    pub zoom: u8,
}

/// Static legend describing the color gradient.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLegend {
    /// Legend heading.
    pub title: String,
    /// Color for the quietest bucket.
    pub low: String,
    /// Color for the busiest bucket.
    pub high: String,
}

impl Default for ApiLegend {
    fn default() -> Self {
        Self {
            title: "Arrest Intensity".to_string(),
            low: LOW_COLOR.to_string(),
            high: HIGH_COLOR.to_string(),
        }
    }
}

/// Response from the map endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMapResponse {
    /// Initial viewport.
    pub center: ApiMapCenter,
    /// Color legend.
    pub legend: ApiLegend,
    /// One marker per active bucket.
    pub markers: Vec<ApiMarker>,
}

/// Dataset statistics as returned by the API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiDatasetStats {
    /// Rows in the dataset.
    pub total_records: u64,
    /// Rows with usable coordinates.
    pub valid_records: u64,
    /// Buckets at or above the activity threshold.
    pub active_buckets: u64,
    /// Largest bucket count before thresholding.
    pub max_bucket_count: Option<u64>,
}

impl From<DatasetStats> for ApiDatasetStats {
    fn from(stats: DatasetStats) -> Self {
        Self {
            total_records: stats.total_records,
            valid_records: stats.valid_records,
            active_buckets: stats.active_buckets,
            max_bucket_count: stats.max_bucket_count,
        }
    }
}

/// A ranked, named location in the summary view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiTopLocation {
    /// 1-based rank.
    pub rank: usize,
    /// Rounded latitude.
    pub latitude: f64,
    /// Rounded longitude.
    pub longitude: f64,
    /// Arrests in the bucket.
    pub count: u64,
    /// Resolved place name or `"Unknown"`.
    pub place: String,
}

impl ApiTopLocation {
    /// Builds an entry from a resolved location and its 0-based position.
    #[must_use]
    pub fn from_resolved(index: usize, location: ResolvedLocation) -> Self {
        Self {
            rank: index + 1,
            latitude: location.bucket.latitude(),
            longitude: location.bucket.longitude(),
            count: location.count,
            place: location.place,
        }
    }
}

/// Response from the summary endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSummaryResponse {
    /// Dataset statistics.
    pub stats: ApiDatasetStats,
    /// Busiest locations, busiest first.
    pub locations: Vec<ApiTopLocation>,
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Error body for failed requests.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Human-readable error message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrest_map_aggregate::{BucketCount, CoordinateBucket, style_markers};

    #[test]
    fn marker_serializes_camel_case() {
        let bucket = CoordinateBucket::new(40.71, -74.0, 2).unwrap();
        let marker = style_markers(&[BucketCount::new(bucket, 12)])
            .into_iter()
            .next()
            .unwrap();
        let json = serde_json::to_value(ApiMarker::from(marker)).unwrap();
        assert_eq!(json["count"], 12);
        assert_eq!(json["intensity"], 0.5);
        assert_eq!(json["radius"], 10.0);
        assert!(json["color"].as_str().unwrap().starts_with('#'));
    }

    #[test]
    fn stats_serialize_camel_case() {
        let stats = ApiDatasetStats {
            total_records: 100,
            valid_records: 90,
            active_buckets: 3,
            max_bucket_count: None,
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["totalRecords"], 100);
        assert_eq!(json["activeBuckets"], 3);
        assert!(json["maxBucketCount"].is_null());
    }

    #[test]
    fn top_location_rank_is_one_based() {
        let location = ResolvedLocation {
            bucket: CoordinateBucket::new(40.82, -73.94, 2).unwrap(),
            count: 20,
            place: "Harlem".to_string(),
        };
        let api = ApiTopLocation::from_resolved(0, location);
        assert_eq!(api.rank, 1);
        assert_eq!(api.place, "Harlem");
    }

    #[test]
    fn summary_params_default_to_none() {
        let params: SummaryQueryParams = serde_json::from_str("{}").unwrap();
        assert!(params.precision.is_none());
        assert!(params.limit.is_none());
    }

    #[test]
    fn legend_uses_gradient_colors() {
        let legend = ApiLegend::default();
        assert_eq!(legend.low, "#fdaf9f");
        assert_eq!(legend.high, "#ff2d00");
    }
}
