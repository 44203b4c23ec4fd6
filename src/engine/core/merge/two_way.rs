use crate::engine::core::entry::Entry;
use crate::engine::core::merge::state::{MergeState, QuantumOutcome};
use crate::engine::errors::MergeError;
use std::cmp::Ordering;
use tracing::{info, trace};

/// What the merge does next, decided from the two head entries.
enum NextAction {
    EmitA,
    EmitB,
    /// Equal keys: B's entry wins, A's shadowed duplicate is retired.
    EmitTie,
    DrainA,
    DrainB,
}

impl MergeState {
    /// Runs merge work until `budget` units are consumed or both inputs
    /// are drained. Every retired source entry costs one unit, so a key
    /// collision costs two. Pauses with input remaining only when the
    /// budget dips below one; a tie is always retired whole, even when
    /// a single unit is left.
    pub fn run_quantum(&mut self, mut budget: i64) -> Result<QuantumOutcome, MergeError> {
        loop {
            let a_has = self.a.ensure_head()?;
            let b_has = self.b.ensure_head()?;

            let action = match (a_has, b_has) {
                (false, false) => return self.finalize(),
                (true, false) => NextAction::DrainA,
                (false, true) => NextAction::DrainB,
                (true, true) => match (self.a.batch.front(), self.b.batch.front()) {
                    (Some(head_a), Some(head_b)) => match head_a.key.cmp(&head_b.key) {
                        Ordering::Less => NextAction::EmitA,
                        Ordering::Greater => NextAction::EmitB,
                        Ordering::Equal => NextAction::EmitTie,
                    },
                    // ensure_head returned true for both sides
                    _ => unreachable!("side reported a head it does not have"),
                },
            };

            if budget < 1 {
                trace!(
                    target: "segforge::merge",
                    output = %self.output,
                    emitted = self.emitted,
                    "Budget exhausted, pausing"
                );
                return Ok(QuantumOutcome::Paused);
            }

            match action {
                NextAction::EmitA | NextAction::DrainA => {
                    if let Some(entry) = self.a.take_head() {
                        budget -= 1;
                        self.emit(entry)?;
                    }
                }
                NextAction::EmitB | NextAction::DrainB => {
                    if let Some(entry) = self.b.take_head() {
                        budget -= 1;
                        self.emit(entry)?;
                    }
                }
                NextAction::EmitTie => {
                    // The older generation's entry is retired unseen.
                    let shadowed = self.a.take_head();
                    if shadowed.is_some() {
                        budget -= 1;
                    }
                    if let Some(entry) = self.b.take_head() {
                        budget -= 1;
                        trace!(
                            target: "segforge::merge",
                            key = ?entry.key,
                            "Key collision, newer side wins"
                        );
                        self.emit(entry)?;
                    }
                }
            }
        }
    }

    /// Writes one entry to the output, unless it is a tombstone bound
    /// for the last level, where no older data remains beneath it.
    fn emit(&mut self, entry: Entry) -> Result<(), MergeError> {
        if self.last_level && entry.is_tombstone() {
            trace!(
                target: "segforge::merge",
                key = ?entry.key,
                "Dropping tombstone at last level"
            );
            return Ok(());
        }

        let builder = self
            .builder
            .as_mut()
            .ok_or_else(|| MergeError::Protocol("emit after finalize".to_string()))?;
        builder.add(entry)?;
        self.emitted += 1;
        Ok(())
    }

    /// Seals the output segment and reports the final count. Both
    /// cursors were already closed when their sides exhausted.
    fn finalize(&mut self) -> Result<QuantumOutcome, MergeError> {
        let builder = self
            .builder
            .take()
            .ok_or_else(|| MergeError::Protocol("merge already finalized".to_string()))?;
        let count = builder.close()?;

        info!(
            target: "segforge::merge",
            output = %self.output,
            count,
            "Merge complete"
        );
        Ok(QuantumOutcome::Complete {
            count,
            output: self.output,
        })
    }
}
