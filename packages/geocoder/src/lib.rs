#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reverse geocoding for arrest hot spots.
//!
//! Resolves a [`CoordinateBucket`] to a neighborhood-level place name. Every
//! lookup goes through the [`GeocodeCache`] first; only a miss reaches the
//! external [`ReverseGeocoder`], and only after the [`RateLimiter`] allows
//! it. Provider settings come from TOML files in `services/` (see
//! [`service_registry`]).
//!
//! Lookups never fail: any adapter error becomes [`UNKNOWN_PLACE`], which is
//! cached like a real answer so it is not retried.

pub mod cache;
pub mod locations;
pub mod nominatim;
pub mod rate_limit;
pub mod service_registry;

#[cfg(test)]
pub(crate) mod test_support;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use arrest_map_records_models::{BucketCount, CoordinateBucket};
pub use cache::{CacheError, GeocodeCache, cache_key};
pub use locations::{ResolvedLocation, resolve_locations};
pub use rate_limit::{MinInterval, NoDelay, RateLimiter};
pub use service_registry::{GeocodingService, ProviderConfig, ServiceError};

/// Place name stored when no name could be resolved.
pub const UNKNOWN_PLACE: &str = "Unknown";

/// Address components tried, in order, when naming a place.
///
/// Spelled the way Nominatim spells them.
pub const PLACE_COMPONENTS: &[&str] = &["neighbourhood", "suburb", "city_district"];

/// A structured address returned by a reverse geocoder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReverseAddress {
    /// Full formatted address, if the provider returned one.
    pub display_name: Option<String>,
    /// Named address components (e.g. `suburb` → `Brooklyn`).
    pub components: BTreeMap<String, String>,
}

/// Picks the most specific place name from `address`.
///
/// Returns the first non-blank component listed in [`PLACE_COMPONENTS`].
#[must_use]
pub fn place_name(address: &ReverseAddress) -> Option<&str> {
    PLACE_COMPONENTS.iter().find_map(|key| {
        address
            .components
            .get(*key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    })
}

/// Errors from reverse geocoding providers.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The provider answered with a non-success status.
    #[error("Unexpected HTTP status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The provider is disabled (offline mode).
    #[error("Geocoding provider is offline")]
    Offline,
}

/// An external service that turns coordinates into an address.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Looks up the address at a coordinate.
    ///
    /// Returns `Ok(None)` when the provider has no address for the point.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] on network, timeout, status or parse
    /// failures.
    async fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<ReverseAddress>, GeocodeError>;
}

/// A geocoder that fails every lookup, for running without network access.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGeocoder;

#[async_trait]
impl ReverseGeocoder for OfflineGeocoder {
    async fn reverse(
        &self,
        _latitude: f64,
        _longitude: f64,
    ) -> Result<Option<ReverseAddress>, GeocodeError> {
        Err(GeocodeError::Offline)
    }
}

/// Builds the geocoder described by a service configuration.
///
/// # Errors
///
/// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
pub fn build_geocoder(service: &GeocodingService) -> Result<Arc<dyn ReverseGeocoder>, GeocodeError> {
    match &service.provider {
        ProviderConfig::NominatimReverse {
            base_url,
            timeout_secs,
            user_agent,
            zoom,
            ..
        } => {
            let geocoder = nominatim::NominatimReverse::new(
                base_url,
                user_agent,
                Duration::from_secs(*timeout_secs),
                *zoom,
            )?;
            Ok(Arc::new(geocoder))
        }
        ProviderConfig::Offline => Ok(Arc::new(OfflineGeocoder)),
    }
}

/// Builds the rate limiter a service configuration asks for.
#[must_use]
pub fn build_rate_limiter(service: &GeocodingService) -> Arc<dyn RateLimiter> {
    match service.provider {
        ProviderConfig::NominatimReverse { rate_limit_ms, .. } if rate_limit_ms > 0 => {
            Arc::new(MinInterval::new(Duration::from_millis(rate_limit_ms)))
        }
        _ => Arc::new(NoDelay),
    }
}
