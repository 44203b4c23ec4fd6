use crate::engine::core::merge::state::MergeSpec;
use crate::engine::core::{MergeSnapshot, MergeState, QuantumOutcome, SegmentId};
use crate::engine::errors::MergeError;
use crate::engine::unit::message::{MergeMessage, MergeStatus, StepOutcome, UnitState};
use crate::shared::config::CONFIG;
use std::time::Duration;
use tokio::sync::mpsc::Receiver;
use tokio::time::timeout;
use tracing::{debug, error, info};

const LOG_TARGET: &str = "merge_unit::worker";

/// Final result of a merge that ran to completion, also delivered as
/// `StepOutcome::MergeDone` to the requester of the last quantum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub count: u64,
    pub output: SegmentId,
}

/// The unit's working set: live between steps, or the compact encoded
/// snapshot while hibernated.
enum UnitEngine {
    Live(MergeState),
    Hibernated { bytes: Vec<u8>, emitted: u64 },
}

/// Main loop of one merge unit. Reactive: does zero work between step
/// requests; hibernates when none arrives within the idle timeout; any
/// failure is logged and returned so the owner observes it on join.
pub(crate) async fn run_unit_loop(
    unit_id: u64,
    spec: MergeSpec,
    mut rx: Receiver<MergeMessage>,
) -> Result<MergeReport, MergeError> {
    let hibernate_after = spec
        .options
        .hibernate_after
        .unwrap_or_else(|| Duration::from_millis(CONFIG.engine.hibernate_after_ms));
    let output = spec.output;

    info!(
        target: LOG_TARGET,
        unit_id,
        input_a = %spec.input_a,
        input_b = %spec.input_b,
        output = %output,
        last_level = spec.last_level,
        "Merge unit started"
    );

    let mut engine = match MergeState::open(&spec) {
        Ok(state) => UnitEngine::Live(state),
        Err(e) => {
            error!(target: LOG_TARGET, unit_id, output = %output, error = %e, "Failed to open merge");
            return Err(e);
        }
    };

    loop {
        // The idle timer only runs while live; a hibernated unit just
        // waits for the next message.
        let msg = if matches!(engine, UnitEngine::Live(_)) {
            match timeout(hibernate_after, rx.recv()).await {
                Ok(msg) => msg,
                Err(_) => {
                    engine = hibernate(unit_id, output, engine)?;
                    continue;
                }
            }
        } else {
            rx.recv().await
        };

        let Some(msg) = msg else {
            info!(
                target: LOG_TARGET,
                unit_id,
                output = %output,
                state = %UnitState::Terminated,
                "Control channel closed; terminating merge unit"
            );
            return Err(MergeError::Aborted);
        };

        match msg {
            MergeMessage::Step { units, reply } => {
                let mut state = match wake(unit_id, output, engine) {
                    Ok(state) => state,
                    Err(e) => {
                        error!(
                            target: LOG_TARGET,
                            unit_id,
                            output = %output,
                            error = %e,
                            "Failed to resume hibernated merge"
                        );
                        return Err(e);
                    }
                };

                match state.run_quantum(units) {
                    Ok(QuantumOutcome::Paused) => {
                        debug!(
                            target: LOG_TARGET,
                            unit_id,
                            emitted = state.emitted(),
                            state = %UnitState::AwaitingStep,
                            "Quantum complete"
                        );
                        engine = UnitEngine::Live(state);
                        let _ = reply.send(StepOutcome::QuantumDone);
                    }
                    Ok(QuantumOutcome::Complete { count, output }) => {
                        info!(
                            target: LOG_TARGET,
                            unit_id,
                            count,
                            output = %output,
                            state = %UnitState::Terminated,
                            "Merge unit finished"
                        );
                        let _ = reply.send(StepOutcome::MergeDone { count, output });
                        return Ok(MergeReport { count, output });
                    }
                    Err(e) => {
                        // The reply sender is dropped here on purpose;
                        // the requester sees the closed channel while
                        // the owner observes the error on join.
                        error!(
                            target: LOG_TARGET,
                            unit_id,
                            output = %output,
                            error = %e,
                            "Merge failed; propagating to supervisor"
                        );
                        return Err(e);
                    }
                }
            }
            MergeMessage::Inspect { reply } => {
                let _ = reply.send(status_of(unit_id, output, &engine));
            }
            MergeMessage::Shutdown { reply } => {
                info!(
                    target: LOG_TARGET,
                    unit_id,
                    output = %output,
                    state = %UnitState::Terminated,
                    "Merge unit shut down by owner"
                );
                let _ = reply.send(());
                return Err(MergeError::Aborted);
            }
        }
    }
}

fn hibernate(
    unit_id: u64,
    output: SegmentId,
    engine: UnitEngine,
) -> Result<UnitEngine, MergeError> {
    match engine {
        UnitEngine::Live(state) => {
            let snapshot = MergeSnapshot::capture(state).map_err(|e| {
                error!(target: LOG_TARGET, unit_id, output = %output, error = %e, "Failed to suspend merge");
                e
            })?;
            let emitted = snapshot.emitted();
            let bytes = snapshot.encode().map_err(|e| {
                error!(target: LOG_TARGET, unit_id, output = %output, error = %e, "Failed to encode snapshot");
                e
            })?;
            info!(
                target: LOG_TARGET,
                unit_id,
                output = %output,
                bytes = bytes.len(),
                state = %UnitState::Hibernated,
                "Merge unit hibernated"
            );
            Ok(UnitEngine::Hibernated { bytes, emitted })
        }
        hibernated => Ok(hibernated),
    }
}

fn wake(unit_id: u64, output: SegmentId, engine: UnitEngine) -> Result<MergeState, MergeError> {
    match engine {
        UnitEngine::Live(state) => Ok(state),
        UnitEngine::Hibernated { bytes, .. } => {
            let state = MergeSnapshot::decode(&bytes)?.resume()?;
            info!(
                target: LOG_TARGET,
                unit_id,
                output = %output,
                state = %UnitState::Running,
                "Merge unit woke from hibernation"
            );
            Ok(state)
        }
    }
}

fn status_of(unit_id: u64, output: SegmentId, engine: &UnitEngine) -> MergeStatus {
    match engine {
        UnitEngine::Live(state) => MergeStatus {
            unit_id,
            state: UnitState::AwaitingStep,
            emitted: state.emitted(),
            output,
            hibernated_bytes: None,
        },
        UnitEngine::Hibernated { bytes, emitted } => MergeStatus {
            unit_id,
            state: UnitState::Hibernated,
            emitted: *emitted,
            output,
            hibernated_bytes: Some(bytes.len()),
        },
    }
}
