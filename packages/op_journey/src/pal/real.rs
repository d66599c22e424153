//! Real platform implementation backed by the operating system monotonic clock.

use std::sync::LazyLock;
use std::time::{Duration, Instant};

use crate::pal::abstractions::Platform;

/// The moment this process first asked for the time. All readings are
/// expressed relative to this epoch so that they fit in a plain [`Duration`].
static PROCESS_EPOCH: LazyLock<Instant> = LazyLock::new(Instant::now);

/// The singleton instance handed out by `PlatformFacade::real()`.
pub(crate) static REAL_PLATFORM: RealPlatform = RealPlatform::new();

/// Real implementation of the platform abstraction.
///
/// [`Instant`] is the monotonic clock on every supported target, so readings
/// can neither fail nor go backwards.
#[derive(Debug)]
pub(crate) struct RealPlatform;

impl RealPlatform {
    pub(crate) const fn new() -> Self {
        Self
    }
}

impl Platform for RealPlatform {
    #[cfg_attr(test, mutants::skip)] // Cannot make meaningful assertions about the real clock.
    fn monotonic_time(&self) -> Duration {
        PROCESS_EPOCH.elapsed()
    }
}
