use std::cell::RefCell;
use std::sync::Arc;

use crate::journey::Journey;
use crate::scoped_stage::ScopedStage;
use crate::stage::Stage;
use crate::tracking::Tracking;

/// The attachment point a host embeds in its per-operation object.
///
/// Holds at most one optional [`Journey`] for the lifetime of the operation.
/// Every instrumentation entry point is a no-op while no journey is attached,
/// which is what makes disabled tracking nearly free: the host calls
/// [`enable`](Self::enable) once at operation start, and from then on the
/// slot decides on every call whether anything is recorded at all.
///
/// The slot is single-threaded, like the operation it belongs to; it cannot
/// be shared with or sent to another thread.
///
/// # Examples
///
/// ```
/// use op_journey::{JourneySlot, Stage, Tracking};
///
/// let tracking = Tracking::enabled();
///
/// // Embedded in the host's per-operation object.
/// let slot = JourneySlot::new();
/// slot.enable(&tracking);
///
/// slot.enter_stage(Stage::CheckAuthorization);
/// // ... authorization work ...
/// slot.enter_stage(Stage::Running);
///
/// // Dropping the slot finalizes the journey and reports it.
/// drop(slot);
/// ```
#[derive(Debug, Default)]
pub struct JourneySlot {
    journey: RefCell<Option<Journey>>,
}

impl JourneySlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            journey: RefCell::new(None),
        }
    }

    /// Attaches a new journey to this slot, starting in [`Stage::Running`].
    ///
    /// Does nothing when `tracking` is disabled - no journey is created and
    /// every later call on this slot stays a no-op.
    ///
    /// # Panics
    ///
    /// Panics if tracking is enabled and a journey is already attached; an
    /// operation has exactly one journey for its lifetime.
    pub fn enable(&self, tracking: &Tracking) {
        let Some(observer) = tracking.observer() else {
            return;
        };

        let mut journey = self.journey.borrow_mut();

        assert!(
            journey.is_none(),
            "journey tracking is enabled at most once per operation"
        );

        *journey = Some(Journey::new(
            Stage::Running,
            Arc::clone(observer),
            tracking.platform().clone(),
        ));
    }

    /// Whether a journey is currently attached.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.journey.borrow().is_some()
    }

    /// The attached journey's current stage, if one is attached.
    #[must_use]
    pub fn current_stage(&self) -> Option<Stage> {
        self.journey.borrow().as_ref().map(Journey::current_stage)
    }

    /// Announces a stage transition on the attached journey.
    ///
    /// A no-op when no journey is attached, so instrumentation call sites do
    /// not need an enabled-check of their own.
    #[inline]
    pub fn enter_stage(&self, stage: Stage) {
        if let Some(journey) = self.journey.borrow_mut().as_mut() {
            journey.enter_stage(stage);
        }
    }

    /// Switches to `stage` until the returned guard is dropped, at which point
    /// the previously active stage is restored. See [`ScopedStage`].
    pub fn scoped(&self, stage: Stage) -> ScopedStage<'_> {
        ScopedStage::new(self, stage)
    }

    /// Runs `f` against the attached journey, if any.
    ///
    /// This is the entry point for diagnostics that want to render a live
    /// journey; ordinary call sites use [`enter_stage`](Self::enter_stage).
    pub fn with_journey<R>(&self, f: impl FnOnce(&Journey) -> R) -> Option<R> {
        self.journey.borrow().as_ref().map(f)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::time::Duration;

    use static_assertions::assert_not_impl_any;

    use super::*;
    use crate::Observer;
    use crate::pal::{FakePlatform, PlatformFacade};

    fn enabled_tracking(platform: &FakePlatform) -> Tracking {
        Tracking::with_parts(
            Some(Arc::new(Observer::new())),
            PlatformFacade::fake(platform.clone()),
        )
    }

    fn disabled_tracking(platform: &FakePlatform) -> Tracking {
        Tracking::with_parts(None, PlatformFacade::fake(platform.clone()))
    }

    #[test]
    fn enable_attaches_a_journey_in_the_running_stage() {
        let platform = FakePlatform::new();
        let tracking = enabled_tracking(&platform);

        let slot = JourneySlot::new();
        assert!(!slot.is_active());

        slot.enable(&tracking);

        assert!(slot.is_active());
        assert_eq!(slot.current_stage(), Some(Stage::Running));
    }

    #[test]
    fn enable_is_inert_when_tracking_is_disabled() {
        let platform = FakePlatform::new();
        let tracking = disabled_tracking(&platform);

        let slot = JourneySlot::new();
        slot.enable(&tracking);

        assert!(!slot.is_active());
        assert_eq!(slot.current_stage(), None);

        // All instrumentation entry points stay no-ops.
        slot.enter_stage(Stage::Egress);
        assert_eq!(slot.current_stage(), None);
        assert!(slot.with_journey(Journey::to_json).is_none());
    }

    #[test]
    #[should_panic(expected = "at most once per operation")]
    fn enabling_twice_is_a_caller_bug() {
        let platform = FakePlatform::new();
        let tracking = enabled_tracking(&platform);

        let slot = JourneySlot::new();
        slot.enable(&tracking);
        slot.enable(&tracking);
    }

    #[test]
    fn enabling_twice_with_disabled_tracking_stays_inert() {
        let platform = FakePlatform::new();
        let tracking = disabled_tracking(&platform);

        let slot = JourneySlot::new();
        slot.enable(&tracking);
        slot.enable(&tracking);

        assert!(!slot.is_active());
    }

    #[test]
    fn enter_stage_forwards_to_the_journey() {
        let platform = FakePlatform::new();
        let tracking = enabled_tracking(&platform);

        let slot = JourneySlot::new();
        slot.enable(&tracking);

        slot.enter_stage(Stage::AcquireDbLock);

        assert_eq!(slot.current_stage(), Some(Stage::AcquireDbLock));
    }

    #[test]
    fn dropping_the_slot_reports_the_journey() {
        let platform = FakePlatform::new();
        let tracking = enabled_tracking(&platform);

        {
            let slot = JourneySlot::new();
            slot.enable(&tracking);
            platform.advance(Duration::from_millis(3));
        }

        let observer = tracking.observer().expect("tracking is enabled");
        assert_eq!(observer.total_ops(), 1);

        let running = observer.stage_snapshot(Stage::Running);
        assert_eq!(running.ops, 1);
        assert_eq!(running.sum_nanos, 3_000_000);
    }

    #[test]
    fn single_threaded_type() {
        assert_not_impl_any!(JourneySlot: Send, Sync);
    }
}
