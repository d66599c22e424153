//! Fake platform implementation for testing.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::pal::abstractions::Platform;

/// Fake implementation of the platform abstraction for testing.
///
/// Time stands still until a test advances it, which makes interval arithmetic
/// in tests exact instead of tolerance-based. Multiple clones of the same
/// `FakePlatform` share the same underlying clock state, so a test can keep a
/// handle and move time forward while measurement is in progress.
#[derive(Clone, Debug)]
pub(crate) struct FakePlatform {
    now: Arc<Mutex<Duration>>,
}

impl FakePlatform {
    /// Creates a new fake platform with the clock at zero.
    pub(crate) fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Moves the clock forward by the given amount.
    ///
    /// Affects all clones of this platform.
    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self
            .now
            .lock()
            .expect("fake clock lock should not be poisoned");

        *now = now
            .checked_add(by)
            .expect("fake clock advanced past the maximum Duration");
    }
}

impl Platform for FakePlatform {
    fn monotonic_time(&self) -> Duration {
        *self
            .now
            .lock()
            .expect("fake clock lock should not be poisoned")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn initializes_at_zero() {
        let platform = FakePlatform::new();

        assert_eq!(platform.monotonic_time(), Duration::ZERO);
    }

    #[test]
    fn advance_moves_the_clock() {
        let platform = FakePlatform::new();

        platform.advance(Duration::from_millis(150));
        assert_eq!(platform.monotonic_time(), Duration::from_millis(150));

        platform.advance(Duration::from_millis(50));
        assert_eq!(platform.monotonic_time(), Duration::from_millis(200));
    }

    #[test]
    fn clones_share_the_clock() {
        let platform1 = FakePlatform::new();
        let platform2 = platform1.clone();

        platform1.advance(Duration::from_millis(100));

        assert_eq!(platform2.monotonic_time(), Duration::from_millis(100));
    }
}
