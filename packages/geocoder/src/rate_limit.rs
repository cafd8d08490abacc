//! Pacing for external geocoder calls.
//!
//! [`crate::GeocodeCache`] calls [`RateLimiter::acquire`] right before each
//! external request and never on a cache hit.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Strategy for spacing out external requests.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Waits until another request may be sent.
    async fn acquire(&self);
}

/// Enforces a minimum interval between consecutive requests.
///
/// The first request goes out immediately. Later requests wait only for
/// whatever is left of the interval since the previous one, so time spent
/// elsewhere (cache hits, parsing) counts towards the delay.
#[derive(Debug)]
pub struct MinInterval {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl MinInterval {
    /// Creates a limiter allowing one request per `interval`.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    /// The configured interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl RateLimiter for MinInterval {
    async fn acquire(&self) {
        let mut last = self.last.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.interval;
            if ready_at > Instant::now() {
                log::trace!("Rate limiter waiting {:?}", ready_at - Instant::now());
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Never waits. For tests and offline runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl RateLimiter for NoDelay {
    async fn acquire(&self) {}
}
