//! Compile-time registry of reverse geocoding service configurations.
//!
//! Each provider is defined in a TOML file under `services/`. The registry
//! embeds these at compile time and exposes them via [`all_services`] and
//! [`reverse_service`].

use serde::Deserialize;
use thiserror::Error;

/// A reverse geocoding service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier (e.g., `"nominatim"`, `"offline"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether this service is picked by [`reverse_service`].
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Selection order. Lower values win.
    pub priority: u32,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Nominatim / `OpenStreetMap` reverse geocoder.
    NominatimReverse {
        /// Endpoint URL (e.g., `"https://nominatim.openstreetmap.org/reverse"`).
        base_url: String,
        /// Minimum delay between requests in milliseconds.
        rate_limit_ms: u64,
        /// Per-request timeout in seconds.
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
        /// Identifying `User-Agent` required by the usage policy.
        user_agent: String,
        /// Address detail level.
        #[serde(default = "default_zoom")]
        zoom: u8,
    },
    /// No network access; every lookup resolves to `"Unknown"`.
    Offline,
}

const fn default_true() -> bool {
    true
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_zoom() -> u8 {
    16
}

impl GeocodingService {
    /// Returns the provider's base URL, or an empty string for providers
    /// that make no requests.
    #[must_use]
    pub fn base_url(&self) -> &str {
        match &self.provider {
            ProviderConfig::NominatimReverse { base_url, .. } => base_url,
            ProviderConfig::Offline => "",
        }
    }

    /// Replaces the provider's base URL. No-op for providers without one.
    pub fn set_base_url(&mut self, url: &str) {
        if let ProviderConfig::NominatimReverse { base_url, .. } = &mut self.provider {
            url.clone_into(base_url);
        }
    }
}

/// Errors from the service registry.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// An embedded TOML file failed to parse.
    #[error("Failed to parse geocoding service '{name}': {source}")]
    Parse {
        /// Registry name of the file.
        name: String,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// The requested service is not in the registry.
    #[error("Unknown geocoding service '{id}'")]
    Unknown {
        /// Requested service ID.
        id: String,
    },

    /// No enabled service exists.
    #[error("No enabled geocoding service is configured")]
    NoneEnabled,
}

// ── Compile-time embedded TOML files ────────────────────────────────

const SERVICE_TOMLS: &[(&str, &str)] = &[
    ("nominatim", include_str!("../services/nominatim.toml")),
    ("offline", include_str!("../services/offline.toml")),
];

#[cfg(test)]
const EXPECTED_SERVICE_COUNT: usize = 2;

/// Returns all geocoding service configurations (enabled and disabled).
///
/// # Errors
///
/// Returns [`ServiceError::Parse`] if an embedded TOML file is malformed.
pub fn all_services() -> Result<Vec<GeocodingService>, ServiceError> {
    SERVICE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str).map_err(|source| ServiceError::Parse {
                name: (*name).to_string(),
                source,
            })
        })
        .collect()
}

/// Returns the enabled service with the lowest priority value.
///
/// # Errors
///
/// Returns [`ServiceError`] if parsing fails or nothing is enabled.
pub fn reverse_service() -> Result<GeocodingService, ServiceError> {
    all_services()?
        .into_iter()
        .filter(|s| s.enabled)
        .min_by_key(|s| s.priority)
        .ok_or(ServiceError::NoneEnabled)
}

/// Returns the service with the given ID, enabled or not.
///
/// # Errors
///
/// Returns [`ServiceError`] if parsing fails or the ID is unknown.
pub fn service_by_id(id: &str) -> Result<GeocodingService, ServiceError> {
    all_services()?
        .into_iter()
        .find(|s| s.id == id)
        .ok_or_else(|| ServiceError::Unknown { id: id.to_string() })
}
