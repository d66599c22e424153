use std::sync::Arc;

use crate::Observer;
use crate::pal::PlatformFacade;

/// Environment variable consulted by [`Tracking::from_env`].
const ENV_VAR: &str = "OP_JOURNEY_TRACKING";

/// Process-startup configuration handle for journey tracking.
///
/// Constructed once when the process starts and stored in the host's
/// process-wide context. When tracking is enabled the handle owns the one
/// [`Observer`] that every finishing journey reports into; when disabled it
/// owns nothing, no journey is ever created, and every instrumentation call
/// site downstream is a no-op.
///
/// Cloning the handle shares the same observer, so it can be handed to
/// whatever parts of the host construct operations.
///
/// # Examples
///
/// ```
/// use op_journey::{JourneySlot, Tracking};
///
/// // Once, at process startup. Use `Tracking::from_env()` to let the
/// // OP_JOURNEY_TRACKING environment variable decide.
/// let tracking = Tracking::enabled();
///
/// // Per operation.
/// let slot = JourneySlot::new();
/// slot.enable(&tracking);
/// ```
#[derive(Clone, Debug)]
pub struct Tracking {
    observer: Option<Arc<Observer>>,
    platform: PlatformFacade,
}

impl Tracking {
    /// Creates a handle with tracking enabled, including the process-wide
    /// observer.
    #[must_use]
    pub fn enabled() -> Self {
        let tracking = Self {
            observer: Some(Arc::new(Observer::new())),
            platform: PlatformFacade::real(),
        };

        tracing::debug!("started operation journey observer");

        tracking
    }

    /// Creates a handle with tracking disabled.
    ///
    /// No observer exists and no journey will ever be created through this
    /// handle.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            observer: None,
            platform: PlatformFacade::real(),
        }
    }

    /// Creates a handle based on the `OP_JOURNEY_TRACKING` environment
    /// variable.
    ///
    /// The values `1`, `true` and `on` (case-insensitive) enable tracking;
    /// anything else, including an unset variable, disables it.
    #[must_use]
    pub fn from_env() -> Self {
        let enabled = std::env::var(ENV_VAR).is_ok_and(|value| {
            let value = value.trim();

            value == "1" || value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("on")
        });

        if enabled {
            Self::enabled()
        } else {
            Self::disabled()
        }
    }

    #[cfg(test)]
    pub(crate) fn with_parts(observer: Option<Arc<Observer>>, platform: PlatformFacade) -> Self {
        Self { observer, platform }
    }

    /// Whether tracking is enabled on this handle.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.observer.is_some()
    }

    /// The process-wide observer, present when tracking is enabled.
    ///
    /// This is the handle a diagnostics/status surface renders on demand.
    #[must_use]
    pub fn observer(&self) -> Option<&Arc<Observer>> {
        self.observer.as_ref()
    }

    pub(crate) fn platform(&self) -> &PlatformFacade {
        &self.platform
    }
}
