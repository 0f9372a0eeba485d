//! Millisecond time base for the poll loop
//!
//! Nothing in the pipeline sleeps. Every wait is expressed as "elapsed
//! milliseconds since a recorded timestamp", checked each time the outer
//! loop polls. Timestamps are plain `u64` milliseconds so tests can drive
//! the pipeline with synthetic time.

use std::time::Instant;

/// Milliseconds since an arbitrary, monotonic origin
pub type Millis = u64;

/// Milliseconds elapsed from `since` to `now`.
///
/// A `now` earlier than `since` counts as zero elapsed time rather than
/// wrapping.
#[inline]
pub fn elapsed(since: Millis, now: Millis) -> Millis {
    now.saturating_sub(since)
}

/// Wall clock backed by [`Instant`], reporting milliseconds since creation
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Start a clock at zero
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Current reading in milliseconds
    pub fn now_ms(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_forward() {
        assert_eq!(elapsed(100, 250), 150);
        assert_eq!(elapsed(0, 0), 0);
    }

    #[test]
    fn test_elapsed_never_wraps() {
        assert_eq!(elapsed(500, 100), 0);
    }

    #[test]
    fn test_monotonic_clock_does_not_go_backwards() {
        let clock = MonotonicClock::new();
        let first = clock.now_ms();
        let second = clock.now_ms();
        assert!(second >= first);
    }
}
