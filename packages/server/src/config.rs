//! Runtime configuration from environment variables.
//!
//! All settings are read once at startup into a [`ServerConfig`]:
//!
//! | Variable | Default |
//! |---|---|
//! | `BIND_ADDR` | `127.0.0.1` |
//! | `PORT` | `8080` |
//! | `ARREST_DATA_PATH` | `NYPD_Arrest_Data__Year_to_Date_.csv` |
//! | `GEOCODE_CACHE_PATH` | `geocache.json` |
//! | `BUCKET_PRECISION` | `2` |
//! | `ACTIVITY_THRESHOLD` | `10` |
//! | `TOP_LOCATIONS` | `10` |
//! | `GEOCODER` | lowest-priority enabled service |
//! | `NOMINATIM_URL` | from the service TOML |

use std::path::PathBuf;
use std::str::FromStr;

use arrest_map_aggregate::{AggregateOptions, DEFAULT_TOP_LOCATIONS};
use arrest_map_geocoder::service_registry::{self, GeocodingService, ServiceError};
use thiserror::Error;

/// Default dataset file name.
pub const DEFAULT_DATA_PATH: &str = "NYPD_Arrest_Data__Year_to_Date_.csv";

/// Default geocode cache file name.
pub const DEFAULT_CACHE_PATH: &str = "geocache.json";

/// Errors from reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable has a value that does not parse.
    #[error("Invalid value '{value}' for {var}: {message}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        message: String,
    },

    /// The geocoding service registry could not be read.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: String,
    /// Port to listen on.
    pub port: u16,
    /// Arrest dataset path.
    pub data_path: PathBuf,
    /// Geocode cache file path.
    pub cache_path: PathBuf,
    /// Default rounding precision and activity threshold.
    pub aggregate: AggregateOptions,
    /// Default number of summary locations.
    pub top_locations: usize,
    /// Reverse geocoding provider.
    pub geocoder: GeocodingService,
}

impl ServerConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is malformed or the geocoding
    /// service cannot be resolved.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads configuration through `lookup`, which returns the value of a
    /// variable if it is set.
    ///
    /// # Errors
    ///
    /// See [`ServerConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = AggregateOptions::default();

        let mut geocoder = match lookup("GEOCODER") {
            Some(id) => service_registry::service_by_id(&id)?,
            None => service_registry::reverse_service()?,
        };
        if let Some(url) = lookup("NOMINATIM_URL") {
            geocoder.set_base_url(&url);
        }

        let config = Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_var(&lookup, "PORT", 8080)?,
            data_path: lookup("ARREST_DATA_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_DATA_PATH), PathBuf::from),
            cache_path: lookup("GEOCODE_CACHE_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH), PathBuf::from),
            aggregate: AggregateOptions {
                precision: parse_var(&lookup, "BUCKET_PRECISION", defaults.precision)?,
                threshold: parse_var(&lookup, "ACTIVITY_THRESHOLD", defaults.threshold)?,
            },
            top_locations: parse_var(&lookup, "TOP_LOCATIONS", DEFAULT_TOP_LOCATIONS)?,
            geocoder,
        };

        config.log();
        Ok(config)
    }

    /// Aggregation options with per-request overrides applied.
    #[must_use]
    pub fn aggregate_options(&self, precision: Option<u8>, threshold: Option<u64>) -> AggregateOptions {
        AggregateOptions {
            precision: precision.unwrap_or(self.aggregate.precision),
            threshold: threshold.unwrap_or(self.aggregate.threshold),
        }
    }

    fn log(&self) {
        log::info!("Dataset: {}", self.data_path.display());
        log::info!("Geocode cache: {}", self.cache_path.display());
        log::info!(
            "Aggregation: precision={} threshold={} top={}",
            self.aggregate.precision,
            self.aggregate.threshold,
            self.top_locations
        );
        log::info!("Geocoder: {} ({})", self.geocoder.name, self.geocoder.base_url());
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            message: e.to_string(),
            value,
        }),
    }
}
