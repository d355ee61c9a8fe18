//! Request pacing
//!
//! Enforces a ceiling of N requests per second by spacing consecutive
//! requests at least `1/N` seconds apart. State lives on the limiter
//! instance, so independent clients never share a budget.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Default requests per second
pub const DEFAULT_RATE_LIMIT: u32 = 3;

/// Minimum-interval rate limiter
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Limiter allowing `per_second` requests per second; 0 disables pacing
    #[must_use]
    pub fn new(per_second: u32) -> Self {
        let min_interval = if per_second == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(1) / per_second
        };
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Minimum spacing between requests
    #[inline]
    #[must_use]
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Block until the next request may be sent, then record it
    ///
    /// The lock is held while sleeping, so concurrent callers are
    /// serialized and the ceiling holds across threads.
    pub fn wait(&self) {
        let mut last = self.last_request.lock();
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                std::thread::sleep(self.min_interval - elapsed);
            }
        }
        *last = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_request_is_immediate() {
        let limiter = RateLimiter::new(1);
        let start = Instant::now();
        limiter.wait();
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn consecutive_requests_are_spaced() {
        let limiter = RateLimiter::new(20);
        let start = Instant::now();
        for _ in 0..5 {
            limiter.wait();
        }
        // 5 requests at 20/s need at least 4 intervals of 50ms
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[test]
    fn zero_disables_pacing() {
        let limiter = RateLimiter::new(0);
        assert_eq!(limiter.min_interval(), Duration::ZERO);
        let start = Instant::now();
        for _ in 0..100 {
            limiter.wait();
        }
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn independent_limiters_do_not_interfere() {
        let a = RateLimiter::new(1);
        let b = RateLimiter::new(1);
        a.wait();
        let start = Instant::now();
        b.wait();
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}
