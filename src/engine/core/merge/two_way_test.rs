use crate::engine::core::merge::state::{MergeOptions, MergeSpec};
use crate::engine::core::{Entry, MergeState, QuantumOutcome, SegmentCursor, SegmentId, UNBOUNDED_UNITS};
use crate::test_helpers::factories::SegmentFactory;
use std::path::Path;
use tempfile::tempdir;

fn spec_for(dir: &Path, last_level: bool) -> MergeSpec {
    MergeSpec {
        dir: dir.to_path_buf(),
        input_a: SegmentId(1),
        input_b: SegmentId(2),
        output: SegmentId(3),
        size_hint: 16,
        last_level,
        options: MergeOptions {
            entries_per_node: Some(2),
            hibernate_after: None,
        },
    }
}

fn build_inputs(dir: &Path, a: Vec<Entry>, b: Vec<Entry>) {
    SegmentFactory::new(dir).with_id(1).with_entries(a).create();
    SegmentFactory::new(dir).with_id(2).with_entries(b).create();
}

fn merge_to_end(dir: &Path, a: Vec<Entry>, b: Vec<Entry>, last_level: bool) -> (Vec<Entry>, u64) {
    build_inputs(dir, a, b);
    let mut state = MergeState::open(&spec_for(dir, last_level)).unwrap();
    match state.run_quantum(UNBOUNDED_UNITS).unwrap() {
        QuantumOutcome::Complete { count, output } => {
            assert_eq!(output, SegmentId(3));
            (SegmentFactory::read_all(dir, output), count)
        }
        QuantumOutcome::Paused => panic!("unbounded merge paused"),
    }
}

#[test]
fn interleaved_inputs_with_collision_prefer_newer_side() {
    let dir = tempdir().unwrap();
    let (out, count) = merge_to_end(
        dir.path(),
        vec![Entry::data("1", "a"), Entry::data("3", "c")],
        vec![Entry::data("2", "b"), Entry::data("3", "d")],
        false,
    );
    assert_eq!(out, vec![
        Entry::data("1", "a"),
        Entry::data("2", "b"),
        Entry::data("3", "d")
    ]);
    assert_eq!(count, 3);
}

#[test]
fn tombstone_dropped_when_merging_into_last_level() {
    let dir = tempdir().unwrap();
    let (out, count) = merge_to_end(dir.path(), vec![Entry::tombstone("1")], vec![], true);
    assert!(out.is_empty());
    assert_eq!(count, 0);
}

#[test]
fn tombstone_preserved_above_last_level() {
    let dir = tempdir().unwrap();
    let (out, count) = merge_to_end(dir.path(), vec![Entry::tombstone("1")], vec![], false);
    assert_eq!(out, vec![Entry::tombstone("1")]);
    assert_eq!(count, 1);
}

#[test]
fn empty_inputs_complete_immediately_with_valid_output() {
    let dir = tempdir().unwrap();
    let (out, count) = merge_to_end(dir.path(), vec![], vec![], false);
    assert!(out.is_empty());
    assert_eq!(count, 0);

    // The sealed output opens like any other segment
    let mut cursor = SegmentCursor::open(dir.path(), SegmentId(3)).unwrap();
    assert!(cursor.next_batch().unwrap().is_none());
    cursor.close();
}

#[test]
fn output_is_key_union_with_newer_values_on_collisions() {
    let dir = tempdir().unwrap();
    let a: Vec<Entry> = [1, 2, 4, 6, 7]
        .iter()
        .map(|i| Entry::data(format!("k{:02}", i), "old"))
        .collect();
    let b: Vec<Entry> = [2, 3, 6, 8]
        .iter()
        .map(|i| Entry::data(format!("k{:02}", i), "new"))
        .collect();

    let (out, count) = merge_to_end(dir.path(), a, b, false);
    assert_eq!(count, 7); // |{1,2,3,4,6,7,8}|

    let keys: Vec<&[u8]> = out.iter().map(|e| e.key.as_slice()).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(keys, sorted, "output keys must be strictly increasing");

    for entry in &out {
        let expected = match entry.key.as_slice() {
            b"k02" | b"k03" | b"k06" | b"k08" => "new",
            _ => "old",
        };
        assert_eq!(entry.value, crate::engine::core::Value::Data(expected.into()));
    }
}

#[test]
fn last_level_removes_tombstones_from_both_phases() {
    let dir = tempdir().unwrap();
    // Tombstones both while two sides are live and in the drain tail
    let a = vec![
        Entry::tombstone("a"),
        Entry::data("c", "1"),
        Entry::tombstone("z"),
    ];
    let b = vec![Entry::data("b", "2"), Entry::tombstone("c")];

    let (out, count) = merge_to_end(dir.path(), a, b, true);
    assert_eq!(out, vec![Entry::data("b", "2")]);
    assert_eq!(count, 1);
}

#[test]
fn quantum_advances_by_exactly_the_requested_units() {
    let dir = tempdir().unwrap();
    let a: Vec<Entry> = [1, 3, 5].iter().map(|i| Entry::data(format!("k{}", i), "a")).collect();
    let b: Vec<Entry> = [2, 4, 6].iter().map(|i| Entry::data(format!("k{}", i), "b")).collect();
    build_inputs(dir.path(), a, b);

    let mut state = MergeState::open(&spec_for(dir.path(), false)).unwrap();
    assert_eq!(state.run_quantum(2).unwrap(), QuantumOutcome::Paused);
    assert_eq!(state.emitted(), 2);
    assert_eq!(state.run_quantum(3).unwrap(), QuantumOutcome::Paused);
    assert_eq!(state.emitted(), 5);
    assert_eq!(state.run_quantum(10).unwrap(), QuantumOutcome::Complete {
        count: 6,
        output: SegmentId(3)
    });
}

#[test]
fn tie_costs_two_units_and_is_retired_whole() {
    let dir = tempdir().unwrap();
    build_inputs(
        dir.path(),
        vec![Entry::data("k1", "old"), Entry::data("k2", "a")],
        vec![Entry::data("k1", "new"), Entry::data("k3", "b")],
    );

    let mut state = MergeState::open(&spec_for(dir.path(), false)).unwrap();
    // One unit requested, but the pending tie retires both source entries
    assert_eq!(state.run_quantum(1).unwrap(), QuantumOutcome::Paused);
    assert_eq!(state.emitted(), 1);

    assert_eq!(state.run_quantum(1).unwrap(), QuantumOutcome::Paused);
    assert_eq!(state.emitted(), 2);

    assert_eq!(state.run_quantum(1).unwrap(), QuantumOutcome::Complete {
        count: 3,
        output: SegmentId(3)
    });

    let out = SegmentFactory::read_all(dir.path(), SegmentId(3));
    assert_eq!(out, vec![
        Entry::data("k1", "new"),
        Entry::data("k2", "a"),
        Entry::data("k3", "b")
    ]);
}

#[test]
fn zero_budget_pauses_before_any_work() {
    let dir = tempdir().unwrap();
    build_inputs(dir.path(), vec![Entry::data("k1", "a")], vec![]);

    let mut state = MergeState::open(&spec_for(dir.path(), false)).unwrap();
    assert_eq!(state.run_quantum(0).unwrap(), QuantumOutcome::Paused);
    assert_eq!(state.emitted(), 0);
}
