//! Test doubles for [`ReverseGeocoder`].

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::rate_limit::RateLimiter;
use crate::{GeocodeError, ReverseAddress, ReverseGeocoder};

#[derive(Debug, Clone)]
enum StubResponse {
    Component(String, String),
    NoMatch,
    Timeout,
}

/// A geocoder that returns a fixed answer and counts how often it is called.
#[derive(Debug)]
pub struct CountingGeocoder {
    response: StubResponse,
    calls: AtomicUsize,
}

impl CountingGeocoder {
    /// Answers every lookup with `{ key: value }` as the only component.
    pub fn with_component(key: &str, value: &str) -> Self {
        Self::new(StubResponse::Component(key.to_string(), value.to_string()))
    }

    /// Answers every lookup with "no address here".
    pub fn no_match() -> Self {
        Self::new(StubResponse::NoMatch)
    }

    /// Fails every lookup with [`GeocodeError::Timeout`].
    pub fn timing_out() -> Self {
        Self::new(StubResponse::Timeout)
    }

    const fn new(response: StubResponse) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `reverse` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReverseGeocoder for CountingGeocoder {
    async fn reverse(
        &self,
        _latitude: f64,
        _longitude: f64,
    ) -> Result<Option<ReverseAddress>, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            StubResponse::Component(key, value) => Ok(Some(ReverseAddress {
                display_name: None,
                components: BTreeMap::from([(key.clone(), value.clone())]),
            })),
            StubResponse::NoMatch => Ok(None),
            StubResponse::Timeout => Err(GeocodeError::Timeout),
        }
    }
}

/// A limiter that never waits and counts how often it is asked.
#[derive(Debug, Default)]
pub struct CountingLimiter {
    acquires: AtomicUsize,
}

impl CountingLimiter {
    /// Number of `acquire` calls so far.
    pub fn acquires(&self) -> usize {
        self.acquires.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateLimiter for CountingLimiter {
    async fn acquire(&self) {
        self.acquires.fetch_add(1, Ordering::SeqCst);
    }
}

/// A unique, not-yet-existing path in the system temp directory.
pub fn temp_cache_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("arrest-map-{}", uuid::Uuid::new_v4()))
        .join("geocache.json")
}
