use crate::engine::core::merge::state::MergeSpec;
use crate::engine::errors::MergeError;
use crate::engine::unit::message::{MergeMessage, MergeStatus, StepOutcome};
use crate::engine::unit::worker::{MergeReport, run_unit_loop};
use crate::shared::config::CONFIG;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

static NEXT_UNIT_ID: AtomicU64 = AtomicU64::new(1);

/// Entry point for starting merges. Each merge runs as its own tokio
/// task owning its cursors and builder exclusively; the handle is the
/// only way to talk to it.
pub struct MergeUnit;

impl MergeUnit {
    pub fn spawn(spec: MergeSpec) -> MergeHandle {
        let unit_id = NEXT_UNIT_ID.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(CONFIG.engine.mailbox_capacity);
        let task = tokio::spawn(run_unit_loop(unit_id, spec, rx));
        MergeHandle { unit_id, tx, task }
    }
}

/// Owner-side handle of one merge unit.
pub struct MergeHandle {
    unit_id: u64,
    tx: mpsc::Sender<MergeMessage>,
    task: JoinHandle<Result<MergeReport, MergeError>>,
}

impl MergeHandle {
    pub fn unit_id(&self) -> u64 {
        self.unit_id
    }

    /// Requests one quantum of `units` merge work and awaits its
    /// outcome. A closed reply channel means the unit failed or was
    /// terminated; the detail is available through `join`.
    pub async fn step(&self, units: i64) -> Result<StepOutcome, MergeError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(MergeMessage::Step { units, reply })
            .await
            .map_err(|_| MergeError::UnitGone("merge unit mailbox closed".to_string()))?;
        rx.await
            .map_err(|_| MergeError::UnitGone("merge unit dropped the step reply".to_string()))
    }

    /// Supervisory introspection; passes through without touching the
    /// merge state.
    pub async fn inspect(&self) -> Result<MergeStatus, MergeError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(MergeMessage::Inspect { reply })
            .await
            .map_err(|_| MergeError::UnitGone("merge unit mailbox closed".to_string()))?;
        rx.await
            .map_err(|_| MergeError::UnitGone("merge unit dropped the inspect reply".to_string()))
    }

    /// Terminates the unit deterministically. No partial-output cleanup
    /// happens here; that is the owner's call.
    pub async fn shutdown(self) -> Result<(), MergeError> {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(MergeMessage::Shutdown { reply }).await.is_ok() {
            let _ = rx.await;
        }
        match self.task.await {
            Ok(Ok(_)) | Ok(Err(MergeError::Aborted)) => Ok(()),
            Ok(Err(e)) => Err(e),
            Err(e) => Err(MergeError::UnitGone(e.to_string())),
        }
    }

    /// Awaits the unit's final result: the completion report, or the
    /// error that aborted the merge.
    pub async fn join(self) -> Result<MergeReport, MergeError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(MergeError::UnitGone(e.to_string())),
        }
    }
}
