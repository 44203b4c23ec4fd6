use crate::engine::core::entry::Entry;
use crate::engine::core::merge::state::{MergeState, Side};
use crate::engine::core::{BuilderSnapshot, CursorSnapshot, SegmentId};
use crate::engine::errors::MergeError;
use crate::shared::config::CONFIG;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Suspended form of one whole merge: both sides, the builder and the
/// policy flags. Produced only for long-idle pauses; lives in the merge
/// unit's memory and is never written to stable storage.
#[derive(Debug, Serialize, Deserialize)]
pub struct MergeSnapshot {
    a: SideSnapshot,
    b: SideSnapshot,
    builder: BuilderSnapshot,
    output: SegmentId,
    last_level: bool,
    emitted: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct SideSnapshot {
    cursor: Option<CursorSnapshot>,
    batch: Vec<Entry>,
}

fn suspend_side(side: Side) -> SideSnapshot {
    SideSnapshot {
        cursor: side.cursor.map(|c| c.suspend()),
        batch: side.batch.into(),
    }
}

fn resume_side(snapshot: SideSnapshot, label: &'static str) -> Result<Side, MergeError> {
    let cursor = snapshot.cursor.map(|c| c.resume()).transpose()?;
    Ok(Side {
        label,
        cursor,
        batch: snapshot.batch.into(),
    })
}

impl MergeSnapshot {
    /// Suspends a paused merge, releasing every file handle it held.
    pub fn capture(state: MergeState) -> Result<Self, MergeError> {
        let builder = state
            .builder
            .ok_or_else(|| MergeError::Protocol("hibernate after finalize".to_string()))?
            .suspend()?;

        Ok(Self {
            a: suspend_side(state.a),
            b: suspend_side(state.b),
            builder,
            output: state.output,
            last_level: state.last_level,
            emitted: state.emitted,
        })
    }

    /// Reconstructs a live `MergeState` at exactly the retained cursor
    /// positions and pending batches.
    pub fn resume(self) -> Result<MergeState, MergeError> {
        Ok(MergeState {
            a: resume_side(self.a, "a")?,
            b: resume_side(self.b, "b")?,
            builder: Some(self.builder.resume()?),
            output: self.output,
            last_level: self.last_level,
            emitted: self.emitted,
        })
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Compact encoding: bincode, then zstd.
    pub fn encode(&self) -> Result<Vec<u8>, MergeError> {
        let serialized =
            bincode::serialize(self).map_err(|e| MergeError::Snapshot(e.to_string()))?;
        let level = CONFIG.engine.snapshot_compression_level;
        let compressed = zstd::encode_all(&serialized[..], level)
            .map_err(|e| MergeError::Snapshot(e.to_string()))?;

        debug!(
            target: "segforge::snapshot",
            output = %self.output,
            raw_bytes = serialized.len(),
            compressed_bytes = compressed.len(),
            "Encoded merge snapshot"
        );
        Ok(compressed)
    }

    /// Decode failures are fatal, the same class as a fresh-open failure.
    pub fn decode(bytes: &[u8]) -> Result<Self, MergeError> {
        let serialized =
            zstd::decode_all(bytes).map_err(|e| MergeError::Snapshot(e.to_string()))?;
        bincode::deserialize(&serialized).map_err(|e| MergeError::Snapshot(e.to_string()))
    }
}
