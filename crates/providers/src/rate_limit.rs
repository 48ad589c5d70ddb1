//! Outbound Rate Limiter
//!
//! A single serialized throttle shared by every worker that calls a remote
//! backend. The limit is backend-wide, so the limiter must be one queue,
//! not per-worker: the slot mutex is held across the sleep, which lines
//! callers up and spaces consecutive calls by at least `min_interval`
//! regardless of which photo or task issued them.
//!
//! Explicitly constructed and injected (owned by the executor), never a
//! module-level global - independent pipelines get independent timing.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Minimum-interval rate limiter for outbound provider calls.
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Wait until the caller may issue the next outbound call.
    ///
    /// Returns once the minimum interval since the previous acquisition has
    /// elapsed; the acquisition time is recorded before returning.
    pub async fn acquire(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}
