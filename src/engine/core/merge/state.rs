use crate::engine::core::{SegmentBuilder, SegmentCursor, SegmentId};
use crate::engine::core::entry::Entry;
use crate::engine::errors::{MergeError, SegmentError};
use crate::shared::config::CONFIG;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Step budget sentinel: run until the merge completes, never pause.
pub const UNBOUNDED_UNITS: i64 = i64::MAX;

/// Everything an owner supplies to start one merge.
#[derive(Debug, Clone)]
pub struct MergeSpec {
    /// Directory holding both inputs; the output is written next to them.
    pub dir: PathBuf,
    pub input_a: SegmentId,
    /// The logically newer segment; wins key collisions.
    pub input_b: SegmentId,
    pub output: SegmentId,
    /// Expected output entry count, used to pre-size the builder.
    pub size_hint: u64,
    /// Set when merging into the deepest level; tombstones are dropped.
    pub last_level: bool,
    pub options: MergeOptions,
}

#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Overrides `engine.entries_per_node` for the output segment.
    pub entries_per_node: Option<usize>,
    /// Overrides `engine.hibernate_after_ms` for the merge unit.
    pub hibernate_after: Option<Duration>,
}

/// One input side of the merge: its cursor (until exhausted) and the
/// current unconsumed batch.
pub(crate) struct Side {
    pub(crate) label: &'static str,
    pub(crate) cursor: Option<SegmentCursor>,
    pub(crate) batch: VecDeque<Entry>,
}

impl Side {
    pub(crate) fn new(label: &'static str, cursor: SegmentCursor) -> Self {
        Self {
            label,
            cursor: Some(cursor),
            batch: VecDeque::new(),
        }
    }

    /// Makes sure the head entry is available, pulling the next node
    /// when the batch runs dry. Returns false once the side is
    /// exhausted; the cursor is closed exactly once at that point.
    pub(crate) fn ensure_head(&mut self) -> Result<bool, SegmentError> {
        while self.batch.is_empty() {
            let Some(cursor) = self.cursor.as_mut() else {
                return Ok(false);
            };
            match cursor.next_batch()? {
                Some(batch) => self.batch = batch.into(),
                None => {
                    if let Some(cursor) = self.cursor.take() {
                        info!(
                            target: "segforge::merge",
                            side = self.label,
                            segment = %cursor.id(),
                            "Input side exhausted"
                        );
                        cursor.close();
                    }
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    pub(crate) fn take_head(&mut self) -> Option<Entry> {
        self.batch.pop_front()
    }
}

/// Outcome of one budgeted quantum of merge work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantumOutcome {
    /// Budget ran out with input remaining.
    Paused,
    /// Both inputs drained and the output segment sealed.
    Complete { count: u64, output: SegmentId },
}

/// Live working set of one merge: two input sides, the output builder
/// and the tombstone policy. Mutated only by the owning merge unit.
pub struct MergeState {
    pub(crate) a: Side,
    pub(crate) b: Side,
    pub(crate) builder: Option<SegmentBuilder>,
    pub(crate) output: SegmentId,
    pub(crate) last_level: bool,
    pub(crate) emitted: u64,
}

impl MergeState {
    /// Opens both input cursors and the output builder.
    pub fn open(spec: &MergeSpec) -> Result<Self, MergeError> {
        let entries_per_node = spec
            .options
            .entries_per_node
            .unwrap_or(CONFIG.engine.entries_per_node);

        let cursor_a = SegmentCursor::open(&spec.dir, spec.input_a)?;
        let cursor_b = SegmentCursor::open(&spec.dir, spec.input_b)?;
        let builder =
            SegmentBuilder::create(&spec.dir, spec.output, spec.size_hint, entries_per_node)?;

        info!(
            target: "segforge::merge",
            input_a = %spec.input_a,
            input_b = %spec.input_b,
            output = %spec.output,
            last_level = spec.last_level,
            "Opened merge state"
        );
        Ok(Self {
            a: Side::new("a", cursor_a),
            b: Side::new("b", cursor_b),
            builder: Some(builder),
            output: spec.output,
            last_level: spec.last_level,
            emitted: 0,
        })
    }

    /// Entries written to the output so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn output(&self) -> SegmentId {
        self.output
    }
}
