//! Fixed-window QPS limiter shared by every outbound catalog call.
//!
//! Capacity resets to `qps` whenever a check happens after the current
//! window has elapsed. Windows are not sliding: up to `2 * qps` calls can land
//! in a one-second span that straddles a reset.

use std::sync::{Mutex, PoisonError};

use shelf_core::ShelfError;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

const WINDOW: Duration = Duration::from_secs(1);

/// Thread-safe limiter allowing a fixed number of calls per one-second window.
#[derive(Debug)]
pub struct RateLimiter {
    qps: u32,
    state: Mutex<Window>,
}

#[derive(Debug)]
struct Window {
    available: u32,
    next_reset: Instant,
}

impl RateLimiter {
    /// Create a limiter allowing `qps` calls per second. A `qps` of zero is
    /// treated as one.
    pub fn new(qps: u32) -> Self {
        let qps = qps.max(1);
        Self {
            qps,
            state: Mutex::new(Window {
                available: qps,
                next_reset: Instant::now() + WINDOW,
            }),
        }
    }

    pub fn qps(&self) -> u32 {
        self.qps
    }

    /// Wait until a call slot is free, then take it.
    ///
    /// Returns the total time spent waiting (zero when a slot was free
    /// immediately), or `ShelfError::Cancelled` if `cancel` fired first.
    pub async fn wait(&self, cancel: &CancellationToken) -> Result<Duration, ShelfError> {
        let mut waited = Duration::ZERO;
        loop {
            let remaining = self.try_wait();
            if remaining.is_zero() {
                return Ok(waited);
            }
            waited += remaining;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ShelfError::Cancelled),
                _ = tokio::time::sleep(remaining) => {}
            }
        }
    }

    /// Non-blocking check.
    ///
    /// Returns zero and takes a slot if one is available. Otherwise nothing is
    /// consumed and the time left until the window resets is returned.
    pub fn try_wait(&self) -> Duration {
        let now = Instant::now();
        let mut window = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if now >= window.next_reset {
            window.available = self.qps;
            window.next_reset = now + WINDOW;
        }

        if window.available > 0 {
            window.available -= 1;
            Duration::ZERO
        } else {
            window.next_reset - now
        }
    }
}

#[cfg(test)]
#[path = "tests/rate_limiter_tests.rs"]
mod tests;
