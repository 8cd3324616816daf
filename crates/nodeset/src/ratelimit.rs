//! Rate limiting for repetitive warnings.
//!
//! Every node-set computation for a misconfigured log would otherwise print
//! the same downsizing warning. A limiter lets at most `limit` messages
//! through per window and counts the rest.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Shared limiter for "storage set size adjusted" warnings.
pub(crate) static DOWNSIZE_WARNINGS: RateLimiter = RateLimiter::new(10, Duration::from_secs(10));

#[derive(Debug)]
struct Window {
    started: Option<Instant>,
    emitted: usize,
    suppressed: usize,
}

/// Allows at most `limit` events per `window`.
#[derive(Debug)]
pub struct RateLimiter {
    limit: usize,
    window: Duration,
    state: Mutex<Window>,
}

impl RateLimiter {
    pub const fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            state: parking_lot::const_mutex(Window {
                started: None,
                emitted: 0,
                suppressed: 0,
            }),
        }
    }

    /// Register an event.
    ///
    /// Returns `Some(n)` if the event may be emitted, where `n` is the number
    /// of events suppressed since the last one that got through, and `None`
    /// if it must be dropped.
    pub fn check(&self) -> Option<usize> {
        let now = Instant::now();
        let mut state = self.state.lock();

        let expired = state
            .started
            .map_or(true, |started| now.duration_since(started) >= self.window);
        if expired {
            state.started = Some(now);
            state.emitted = 0;
        }

        if state.emitted < self.limit {
            state.emitted += 1;
            Some(std::mem::take(&mut state.suppressed))
        } else {
            state.suppressed += 1;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_within_window() {
        let limiter = RateLimiter::new(2, Duration::from_secs(3600));
        assert_eq!(limiter.check(), Some(0));
        assert_eq!(limiter.check(), Some(0));
        assert_eq!(limiter.check(), None);
        assert_eq!(limiter.check(), None);
    }

    #[test]
    fn test_suppressed_count_reported_after_window() {
        let limiter = RateLimiter::new(1, Duration::from_secs(3600));
        assert_eq!(limiter.check(), Some(0));
        assert_eq!(limiter.check(), None);
        assert_eq!(limiter.check(), None);

        limiter.state.lock().started = None;
        assert_eq!(limiter.check(), Some(2));
        assert_eq!(limiter.check(), None);
    }

    #[test]
    fn test_zero_window_never_limits() {
        let limiter = RateLimiter::new(1, Duration::ZERO);
        for _ in 0..5 {
            assert_eq!(limiter.check(), Some(0));
        }
    }
}
