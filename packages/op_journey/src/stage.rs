use std::fmt;

/// One named step of operation processing.
///
/// Stages form a small closed set with fixed ordinals. [`Stage::Running`] is the
/// first stage of every operation and [`Stage::Destroyed`] is the last, entered
/// only during teardown. Every stage before `Destroyed` owns a duration bucket
/// in a journey's profile; `Destroyed` itself does not, which is why its ordinal
/// doubles as the bucket array bound.
///
/// The diagnostic name of each stage is part of the stable output contract and
/// is produced by [`Stage::name`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[expect(
    clippy::exhaustive_enums,
    reason = "the stage set is closed on purpose - adding a stage must break every match so the name table cannot fall out of date"
)]
#[repr(usize)]
pub enum Stage {
    /// The operation is executing its own logic, not waiting on anything tracked.
    ///
    /// Every journey starts here. This must remain the first variant.
    Running = 0,

    /// Waiting until the requested read concern can be satisfied.
    WaitForReadConcern,

    /// Waiting until the requested write concern has been acknowledged.
    WaitForWriteConcern,

    /// Forwarding a sampled read to mirrored nodes.
    ReadMirroring,

    /// Evaluating whether the caller is authorized to run the operation.
    CheckAuthorization,

    /// Parsing the read concern out of the request.
    ExtractReadConcern,

    /// Waiting to acquire the database lock.
    AcquireDbLock,

    /// Computing the operation time and gossiping it to peers.
    ComputeAndGossipOpTime,

    /// Writing the response back out over the network.
    Egress,

    /// The operation has released its resources and is awaiting teardown.
    Released,

    /// Terminal stage, entered exactly once during teardown.
    ///
    /// This must remain the last variant.
    Destroyed,
}

impl Stage {
    /// Number of stages that accumulate time, which is every stage except the
    /// terminal [`Self::Destroyed`]. This sizes all per-stage storage.
    pub const TRACKED: usize = Self::Destroyed as usize;

    /// The trackable stages in ordinal order.
    ///
    /// Index-aligned with every per-stage array in this crate; the alignment
    /// is verified by tests below.
    const TRACKED_STAGES: [Stage; Self::TRACKED] = [
        Self::Running,
        Self::WaitForReadConcern,
        Self::WaitForWriteConcern,
        Self::ReadMirroring,
        Self::CheckAuthorization,
        Self::ExtractReadConcern,
        Self::AcquireDbLock,
        Self::ComputeAndGossipOpTime,
        Self::Egress,
        Self::Released,
    ];

    /// The trackable stages in ordinal order, excluding [`Self::Destroyed`].
    pub fn tracked() -> impl Iterator<Item = Stage> {
        Self::TRACKED_STAGES.into_iter()
    }

    /// The stable diagnostic name of this stage.
    ///
    /// These strings are an output contract - diagnostics consumers key off
    /// them - so they never change, and the match deliberately has no fallback
    /// arm: a stage cannot exist without a name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::WaitForReadConcern => "waitForReadConcern",
            Self::WaitForWriteConcern => "waitForWriteConcern",
            Self::ReadMirroring => "readMirroring",
            Self::CheckAuthorization => "checkAuthorization",
            Self::ExtractReadConcern => "extractReadConcern",
            Self::AcquireDbLock => "acquireDbLock",
            Self::ComputeAndGossipOpTime => "computeAndGossipOpTime",
            Self::Egress => "egress",
            Self::Released => "released",
            Self::Destroyed => "destroyed",
        }
    }

    /// Ordinal index of this stage, used to address per-stage arrays.
    #[must_use]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn running_is_first_and_destroyed_is_last() {
        assert_eq!(Stage::Running.index(), 0);
        assert_eq!(Stage::Destroyed.index(), Stage::TRACKED);
    }

    #[test]
    fn tracked_stages_are_index_aligned() {
        for (index, stage) in Stage::tracked().enumerate() {
            assert_eq!(
                stage.index(),
                index,
                "stage {stage} is out of place in the tracked table"
            );
        }

        assert_eq!(Stage::tracked().count(), Stage::TRACKED);
    }

    #[test]
    fn destroyed_is_not_a_tracked_stage() {
        assert!(Stage::tracked().all(|stage| stage != Stage::Destroyed));
    }

    #[test]
    fn names_follow_the_stable_contract() {
        assert_eq!(Stage::Running.name(), "running");
        assert_eq!(Stage::WaitForReadConcern.name(), "waitForReadConcern");
        assert_eq!(Stage::WaitForWriteConcern.name(), "waitForWriteConcern");
        assert_eq!(Stage::ReadMirroring.name(), "readMirroring");
        assert_eq!(Stage::CheckAuthorization.name(), "checkAuthorization");
        assert_eq!(Stage::ExtractReadConcern.name(), "extractReadConcern");
        assert_eq!(Stage::AcquireDbLock.name(), "acquireDbLock");
        assert_eq!(
            Stage::ComputeAndGossipOpTime.name(),
            "computeAndGossipOpTime"
        );
        assert_eq!(Stage::Egress.name(), "egress");
        assert_eq!(Stage::Released.name(), "released");
        assert_eq!(Stage::Destroyed.name(), "destroyed");
    }

    #[test]
    fn names_are_unique() {
        let mut names = Stage::tracked().map(Stage::name).collect::<Vec<_>>();
        names.push(Stage::Destroyed.name());

        let total = names.len();
        names.sort_unstable();
        names.dedup();

        assert_eq!(names.len(), total);
    }

    #[test]
    fn display_uses_the_stable_name() {
        assert_eq!(Stage::Egress.to_string(), "egress");
        assert_eq!(Stage::AcquireDbLock.to_string(), "acquireDbLock");
    }
}
