//! Platform abstraction trait definitions.

use std::fmt::Debug;
use std::time::Duration;

/// Provides the monotonic clock readings that all journey timing is built on.
///
/// This trait abstracts the underlying time source, allowing for the real
/// implementation (the operating system monotonic clock) and a fake
/// implementation for testing.
pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// Time elapsed since an arbitrary process-local epoch.
    ///
    /// Readings are monotonic: a later call never returns a smaller value.
    fn monotonic_time(&self) -> Duration;
}
