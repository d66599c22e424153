use std::marker::PhantomData;
use std::mem;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::Observer;
use crate::Stage;
use crate::pal::{Platform, PlatformFacade};

/// The active stage and the clock reading at which it was entered.
#[derive(Debug)]
struct CurrentStage {
    stage: Stage,
    entered: Duration,
}

/// Per-operation phase timer.
///
/// A journey belongs to exactly one in-flight operation and records how much
/// wall-clock time that operation spends in each [`Stage`]. The operation's
/// execution path drives it by announcing stage transitions; the journey never
/// schedules, retries or otherwise influences the work it observes.
///
/// A journey has exactly one writer by design: the type is neither [`Send`]
/// nor [`Sync`], so the thread that creates it is the only thread that can
/// ever touch it, and no internal synchronization exists or is needed.
///
/// Dropping the journey finalizes the last open stage, reports the completed
/// profile to the process-wide [`Observer`] exactly once and emits the
/// per-operation breakdown at debug level.
///
/// Hosts do not construct journeys directly; they embed a
/// [`JourneySlot`](crate::JourneySlot) in their per-operation object and call
/// [`JourneySlot::enable`](crate::JourneySlot::enable) at operation start.
#[derive(Debug)]
pub struct Journey {
    platform: PlatformFacade,
    observer: Arc<Observer>,

    /// Clock reading at construction. Total elapsed time is measured from here.
    created: Duration,

    current: CurrentStage,

    /// Accumulated time per trackable stage, indexed by stage ordinal.
    profile: [Duration; Stage::TRACKED],

    _single_threaded: PhantomData<*const ()>,
}

impl Journey {
    pub(crate) fn new(stage: Stage, observer: Arc<Observer>, platform: PlatformFacade) -> Self {
        let created = platform.monotonic_time();

        Self {
            platform,
            observer,
            created,
            current: CurrentStage {
                stage,
                entered: created,
            },
            profile: [Duration::ZERO; Stage::TRACKED],
            _single_threaded: PhantomData,
        }
    }

    /// The stage the operation is currently in.
    #[must_use]
    pub fn current_stage(&self) -> Stage {
        self.current.stage
    }

    /// Switches the journey to a new stage.
    ///
    /// Closes the duration bucket of the outgoing stage and starts timing the
    /// new one. Announcing the stage the journey is already in is a no-op, so
    /// call sites do not need to know what was announced before them.
    ///
    /// [`Stage::Destroyed`] is reserved for teardown and is not a valid
    /// argument here.
    pub fn enter_stage(&mut self, stage: Stage) {
        debug_assert!(
            stage != Stage::Destroyed,
            "the terminal stage is entered by teardown, not by call sites"
        );

        self.transition_to(stage);
    }

    fn transition_to(&mut self, stage: Stage) {
        let old = mem::replace(&mut self.current.stage, stage);
        if old == stage {
            return;
        }

        let now = self.platform.monotonic_time();
        let elapsed = now.saturating_sub(self.current.entered);

        let bucket = self
            .profile
            .get_mut(old.index())
            .expect("only the terminal stage lacks a bucket and it is never left once entered");

        *bucket = bucket.checked_add(elapsed).expect(
            "stage time accumulation overflows Duration - this indicates an unrealistic scenario",
        );

        self.current.entered = now;
    }

    /// Renders the journey's profile into a structured document.
    ///
    /// One `{name: nanoseconds}` entry per stage with a nonzero bucket, then a
    /// trailing `other` entry holding elapsed time not attributed to any
    /// tracked stage. For a live journey the open bucket of the current stage
    /// has not been closed yet, so its time-so-far shows up under `other`.
    pub fn append(&self, doc: &mut Map<String, Value>) {
        let mut sum = Duration::ZERO;

        for (stage, &duration) in Stage::tracked().zip(&self.profile) {
            if duration.is_zero() {
                continue;
            }

            doc.insert(
                stage.name().to_string(),
                Value::from(duration_nanos(duration)),
            );

            sum = sum
                .checked_add(duration)
                .expect("profile sum overflows Duration - this indicates an unrealistic scenario");
        }

        let total = self.platform.monotonic_time().saturating_sub(self.created);
        let other = total.saturating_sub(sum);

        doc.insert("other".to_string(), Value::from(duration_nanos(other)));
    }

    /// Renders the journey's profile as a standalone JSON object.
    ///
    /// Convenience form of [`append`](Self::append).
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut doc = Map::new();
        self.append(&mut doc);
        Value::Object(doc)
    }

    pub(crate) fn profile(&self) -> &[Duration; Stage::TRACKED] {
        &self.profile
    }
}

impl Drop for Journey {
    fn drop(&mut self) {
        self.transition_to(Stage::Destroyed);

        self.observer.capture(self);

        tracing::debug!(
            summary = %self.to_json(),
            "operation reached the end of its journey"
        );
    }
}

/// Converts a duration to whole nanoseconds for rendering and aggregation.
pub(crate) fn duration_nanos(duration: Duration) -> u64 {
    duration
        .as_nanos()
        .try_into()
        .expect("all realistic durations fit in u64 nanoseconds")
}
