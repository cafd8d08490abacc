//! Persistent place-name cache.
//!
//! A flat JSON object on disk mapping `"<lat>,<lon>"` (two decimals, however
//! finely the bucket was rounded) to a place name. Failed lookups are stored
//! as [`UNKNOWN_PLACE`] so they are not retried.
//!
//! The cache is a plain owned value; mutation needs `&mut self`. Callers
//! that share one instance across requests must put it behind a single lock
//! and hold that lock across a whole batch of lookups plus the save.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use arrest_map_records_models::CoordinateBucket;
use thiserror::Error;

use crate::rate_limit::RateLimiter;
use crate::{ReverseGeocoder, UNKNOWN_PLACE, place_name};

/// Errors from loading or saving the cache file.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache file could not be read or written.
    #[error("Geocode cache I/O error at {path}: {source}")]
    Io {
        /// Cache file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The cache file exists but is not a JSON object of strings.
    #[error("Geocode cache at {path} is corrupt: {source}")]
    Corrupt {
        /// Cache file path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The cache could not be serialized.
    #[error("Failed to serialize geocode cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Builds the cache key for a bucket: `"<lat>,<lon>"` with two decimals.
#[must_use]
pub fn cache_key(bucket: &CoordinateBucket) -> String {
    format!("{:.2},{:.2}", bucket.latitude(), bucket.longitude())
}

/// In-memory view of the geocode cache file.
#[derive(Debug, Clone)]
pub struct GeocodeCache {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    dirty: bool,
}

impl GeocodeCache {
    /// Creates an empty cache that will be saved to `path`.
    #[must_use]
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
            dirty: false,
        }
    }

    /// Loads the cache file at `path`.
    ///
    /// A missing file gives an empty cache.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if the file exists but cannot be read, or
    /// [`CacheError::Corrupt`] if it is not a JSON object of strings.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();

        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!(
                    "No geocode cache at {}, starting empty",
                    path.display()
                );
                return Ok(Self::empty(path));
            }
            Err(source) => return Err(CacheError::Io { path, source }),
        };

        let entries: BTreeMap<String, String> = match serde_json::from_str(&text) {
            Ok(entries) => entries,
            Err(source) => return Err(CacheError::Corrupt { path, source }),
        };

        log::info!(
            "Loaded {} geocode cache entries from {}",
            entries.len(),
            path.display()
        );

        Ok(Self {
            path,
            entries,
            dirty: false,
        })
    }

    /// Where the cache is saved.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether entries were added since the last load or save.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the cached place name for a bucket, without any lookup.
    #[must_use]
    pub fn get(&self, bucket: &CoordinateBucket) -> Option<&str> {
        self.entries.get(&cache_key(bucket)).map(String::as_str)
    }

    /// Resolves a bucket to a place name.
    ///
    /// A cache hit returns immediately. On a miss this waits for `limiter`,
    /// calls `geocoder`, and stores the result. Adapter errors and addresses
    /// without a usable component resolve to [`UNKNOWN_PLACE`], which is
    /// stored too.
    pub async fn lookup(
        &mut self,
        bucket: &CoordinateBucket,
        geocoder: &dyn ReverseGeocoder,
        limiter: &dyn RateLimiter,
    ) -> String {
        let key = cache_key(bucket);
        if let Some(name) = self.entries.get(&key) {
            log::trace!("Geocode cache hit for {key}: {name}");
            return name.clone();
        }

        limiter.acquire().await;

        let name = match geocoder.reverse(bucket.latitude(), bucket.longitude()).await {
            Ok(Some(address)) => place_name(&address).unwrap_or(UNKNOWN_PLACE).to_string(),
            Ok(None) => {
                log::debug!("Reverse geocoder has no address for {key}");
                UNKNOWN_PLACE.to_string()
            }
            Err(e) => {
                log::warn!("Reverse geocoding failed for {key}: {e}");
                UNKNOWN_PLACE.to_string()
            }
        };

        log::debug!("Geocoded {key} -> {name}");
        self.entries.insert(key, name.clone());
        self.dirty = true;
        name
    }

    /// Writes the whole cache to disk, replacing the file atomically.
    ///
    /// The JSON is written to a sibling temporary file first and then
    /// renamed over the target. Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if serialization or any file operation fails.
    pub fn save(&mut self) -> Result<(), CacheError> {
        let json = serde_json::to_string_pretty(&self.entries)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let tmp = self.temp_path();
        std::fs::write(&tmp, json).map_err(|source| self.io_error(source))?;
        std::fs::rename(&tmp, &self.path).map_err(|source| self.io_error(source))?;

        self.dirty = false;
        log::info!(
            "Saved {} geocode cache entries to {}",
            self.entries.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Saves only if entries were added. Returns whether a write happened.
    ///
    /// # Errors
    ///
    /// See [`GeocodeCache::save`].
    pub fn save_if_dirty(&mut self) -> Result<bool, CacheError> {
        if !self.dirty {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
