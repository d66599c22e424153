use crate::journey_slot::JourneySlot;
use crate::stage::Stage;

/// Switches a journey to a stage for the duration of a scope.
///
/// On construction the guard records the stage the operation is currently in
/// and enters the requested one; when dropped - on normal exit, early return
/// and unwind alike - it restores the recorded stage. Guards therefore nest
/// like a stack, and call sites never have to pair an entry with a manual
/// restore.
///
/// The guard is inert when the slot has no journey attached (tracking
/// disabled). It cannot be cloned and, like the slot it borrows, cannot leave
/// the operation's thread.
///
/// Obtained from [`JourneySlot::scoped`].
///
/// # Examples
///
/// ```
/// use op_journey::{JourneySlot, Stage, Tracking};
///
/// let tracking = Tracking::enabled();
/// let slot = JourneySlot::new();
/// slot.enable(&tracking);
///
/// {
///     let _egress = slot.scoped(Stage::Egress);
///     // ... write the response ...
/// } // Back to Stage::Running here, on every exit path.
///
/// assert_eq!(slot.current_stage(), Some(Stage::Running));
/// ```
#[derive(Debug)]
#[must_use = "the previous stage is restored when the guard is dropped"]
pub struct ScopedStage<'a> {
    slot: &'a JourneySlot,

    /// The stage to restore on drop. `None` when the slot had no journey at
    /// construction, in which case the guard does nothing at all.
    prior: Option<Stage>,
}

impl<'a> ScopedStage<'a> {
    pub(crate) fn new(slot: &'a JourneySlot, stage: Stage) -> Self {
        let prior = slot.current_stage();

        if prior.is_some() {
            slot.enter_stage(stage);
        }

        Self { slot, prior }
    }
}

impl Drop for ScopedStage<'_> {
    fn drop(&mut self) {
        if let Some(prior) = self.prior {
            self.slot.enter_stage(prior);
        }
    }
}
