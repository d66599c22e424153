use std::array;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Map, Value};

use crate::Stage;
use crate::journey::{Journey, duration_nanos};

/// We use `Relaxed` ordering for all aggregate accesses to keep the capture
/// path as fast as possible - on 64-bit platforms this is approximately
/// equivalent to non-atomic access. No field carries information about any
/// other field, so no ordering relationship between them needs publishing.
const AGGREGATE_ORDERING: Ordering = Ordering::Relaxed;

/// Running statistics for one stage across all captured journeys.
///
/// All durations are whole nanoseconds.
#[derive(Debug)]
struct StageAggregate {
    /// How many journeys spent a nonzero amount of time in this stage.
    ops: AtomicU64,

    duration_sum: AtomicU64,

    /// `u64::MAX` until the first capture, so any real duration replaces it.
    min: AtomicU64,

    /// Zero until the first capture, so any real duration replaces it.
    max: AtomicU64,
}

impl StageAggregate {
    fn new() -> Self {
        Self {
            ops: AtomicU64::new(0),
            duration_sum: AtomicU64::new(0),
            min: AtomicU64::new(u64::MAX),
            max: AtomicU64::new(0),
        }
    }
}

/// Process-wide aggregator that folds every finished [`Journey`] into running
/// per-stage statistics: operation count, summed duration, minimum and
/// maximum.
///
/// One instance exists per process, created at startup when tracking is
/// enabled (see [`Tracking`](crate::Tracking)); every journey reports into it
/// once, during teardown. The aggregate only ever grows - nothing is removed
/// or reset for the life of the process.
///
/// All state is independent atomics, so any number of operations may finish
/// concurrently without coordination: there is no lock anywhere, and capture
/// calls from different operations never interact except through the atomics
/// themselves. Reads are equally lock-free, which means a document rendered
/// while writers are active may mix values from slightly different moments;
/// see [`append`](Self::append) for how that is surfaced.
///
/// # Examples
///
/// ```
/// use op_journey::{JourneySlot, Stage, Tracking};
///
/// let tracking = Tracking::enabled();
///
/// for _ in 0..3 {
///     let slot = JourneySlot::new();
///     slot.enable(&tracking);
///     slot.enter_stage(Stage::Egress);
///     // ... the operation runs and the slot drops at its end ...
/// }
///
/// let observer = tracking.observer().expect("tracking is enabled");
/// println!("{observer}");
/// ```
#[derive(Debug)]
pub struct Observer {
    /// Count of journeys fully captured, regardless of which stages they saw.
    total_ops: AtomicU64,

    /// Indexed by stage ordinal.
    stages: [StageAggregate; Stage::TRACKED],
}

impl Observer {
    pub(crate) fn new() -> Self {
        Self {
            total_ops: AtomicU64::new(0),
            stages: array::from_fn(|_| StageAggregate::new()),
        }
    }

    /// Folds one finished journey's profile into the aggregate.
    ///
    /// Called exactly once per journey, during teardown, potentially from many
    /// operation threads at once. Stages the journey spent no time in are not
    /// counted as observations for that stage.
    pub(crate) fn capture(&self, journey: &Journey) {
        assert!(
            journey.current_stage() == Stage::Destroyed,
            "only a finished journey can be captured"
        );

        for (aggregate, &duration) in self.stages.iter().zip(journey.profile()) {
            if duration.is_zero() {
                continue;
            }

            let nanos = duration_nanos(duration);

            aggregate.ops.fetch_add(1, AGGREGATE_ORDERING);
            aggregate.duration_sum.fetch_add(nanos, AGGREGATE_ORDERING);

            // Optimistic retry for the bounds: a retry only happens when a
            // concurrent writer has already advanced the bound past our
            // candidate, so no two writers can hold each other up.
            let mut max = aggregate.max.load(AGGREGATE_ORDERING);
            while nanos > max {
                match aggregate.max.compare_exchange_weak(
                    max,
                    nanos,
                    AGGREGATE_ORDERING,
                    AGGREGATE_ORDERING,
                ) {
                    Ok(_) => break,
                    Err(current) => max = current,
                }
            }

            let mut min = aggregate.min.load(AGGREGATE_ORDERING);
            while nanos < min {
                match aggregate.min.compare_exchange_weak(
                    min,
                    nanos,
                    AGGREGATE_ORDERING,
                    AGGREGATE_ORDERING,
                ) {
                    Ok(_) => break,
                    Err(current) => min = current,
                }
            }
        }

        self.total_ops.fetch_add(1, AGGREGATE_ORDERING);
    }

    /// Renders the aggregate into a structured document.
    ///
    /// One `{min, max, avg}` entry (whole nanoseconds) per stage that has been
    /// observed at least once, then the total operation count as `operations`.
    ///
    /// The fields are read without any cross-field synchronization, so a
    /// document rendered while operations are finishing may mix values from
    /// slightly different moments. The trailing `stable` field reports whether
    /// the operation count moved during rendering - a best-effort indicator
    /// for consumers, not a consistency guarantee.
    pub fn append(&self, doc: &mut Map<String, Value>) {
        let ops_before = self.total_ops.load(AGGREGATE_ORDERING);

        for (stage, aggregate) in Stage::tracked().zip(&self.stages) {
            let ops = aggregate.ops.load(AGGREGATE_ORDERING);
            if ops == 0 {
                continue;
            }

            let sum = aggregate.duration_sum.load(AGGREGATE_ORDERING);
            let avg = sum
                .checked_div(ops)
                .expect("guarded by the ops == 0 check above");

            let mut summary = Map::new();
            summary.insert(
                "min".to_string(),
                Value::from(aggregate.min.load(AGGREGATE_ORDERING)),
            );
            summary.insert(
                "max".to_string(),
                Value::from(aggregate.max.load(AGGREGATE_ORDERING)),
            );
            summary.insert("avg".to_string(), Value::from(avg));

            doc.insert(stage.name().to_string(), Value::Object(summary));
        }

        doc.insert("operations".to_string(), Value::from(ops_before));
        doc.insert(
            "stable".to_string(),
            Value::from(ops_before == self.total_ops.load(AGGREGATE_ORDERING)),
        );
    }

    /// Renders the aggregate as a standalone JSON object.
    ///
    /// Convenience form of [`append`](Self::append).
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut doc = Map::new();
        self.append(&mut doc);
        Value::Object(doc)
    }
}

#[cfg(test)]
impl Observer {
    pub(crate) fn total_ops(&self) -> u64 {
        self.total_ops.load(AGGREGATE_ORDERING)
    }

    pub(crate) fn stage_snapshot(&self, stage: Stage) -> StageSnapshot {
        let aggregate = self
            .stages
            .get(stage.index())
            .expect("every trackable stage has an aggregate slot");

        StageSnapshot {
            ops: aggregate.ops.load(AGGREGATE_ORDERING),
            sum_nanos: aggregate.duration_sum.load(AGGREGATE_ORDERING),
            min_nanos: aggregate.min.load(AGGREGATE_ORDERING),
            max_nanos: aggregate.max.load(AGGREGATE_ORDERING),
        }
    }
}

/// Point-in-time copy of one stage's aggregate, for test assertions.
#[cfg(test)]
#[derive(Debug, Eq, PartialEq)]
pub(crate) struct StageSnapshot {
    pub(crate) ops: u64,
    pub(crate) sum_nanos: u64,
    pub(crate) min_nanos: u64,
    pub(crate) max_nanos: u64,
}

impl fmt::Display for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
