use crate::engine::core::SegmentId;
use std::fmt;
use tokio::sync::oneshot;

/// Control traffic accepted by a merge unit's mailbox. A single mailbox
/// serializes all requests, so conflicting concurrent steps cannot
/// occur by construction.
pub enum MergeMessage {
    /// Run up to `units` units of merge work, then report back.
    Step {
        units: i64,
        reply: oneshot::Sender<StepOutcome>,
    },
    /// Administrative introspection; never disturbs the merge state.
    Inspect { reply: oneshot::Sender<MergeStatus> },
    /// Deterministic termination; acked before the unit exits.
    Shutdown { reply: oneshot::Sender<()> },
}

/// Reply to one step request. A failed quantum sends nothing: the reply
/// channel is dropped and the requester observes the closed channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The quantum's budget was consumed with input remaining.
    QuantumDone,
    /// The merge ran to completion during this quantum.
    MergeDone { count: u64, output: SegmentId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Running,
    AwaitingStep,
    Hibernated,
    Terminated,
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitState::Running => "running",
            UnitState::AwaitingStep => "awaiting-step",
            UnitState::Hibernated => "hibernated",
            UnitState::Terminated => "terminated",
        };
        write!(f, "{}", name)
    }
}

/// Snapshot of a unit's externally observable state.
#[derive(Debug, Clone)]
pub struct MergeStatus {
    pub unit_id: u64,
    pub state: UnitState,
    pub emitted: u64,
    pub output: SegmentId,
    /// Size of the encoded snapshot while hibernated.
    pub hibernated_bytes: Option<usize>,
}
