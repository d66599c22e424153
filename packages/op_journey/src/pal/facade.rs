//! Facade that dispatches platform calls to the real or fake implementation.

use std::time::Duration;

use crate::pal::abstractions::Platform;
#[cfg(test)]
use crate::pal::fake::FakePlatform;
use crate::pal::real::{REAL_PLATFORM, RealPlatform};

/// Dispatches platform calls to either the real platform or a test fake.
#[derive(Clone, Debug)]
pub(crate) enum PlatformFacade {
    Real(&'static RealPlatform),

    #[cfg(test)]
    Fake(FakePlatform),
}

impl PlatformFacade {
    pub(crate) fn real() -> Self {
        Self::Real(&REAL_PLATFORM)
    }

    #[cfg(test)]
    pub(crate) fn fake(platform: FakePlatform) -> Self {
        Self::Fake(platform)
    }
}

impl Platform for PlatformFacade {
    fn monotonic_time(&self) -> Duration {
        match self {
            Self::Real(platform) => platform.monotonic_time(),
            #[cfg(test)]
            Self::Fake(platform) => platform.monotonic_time(),
        }
    }
}
