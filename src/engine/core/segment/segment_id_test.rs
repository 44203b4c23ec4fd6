use crate::engine::core::SegmentId;
use std::path::Path;

#[test]
fn labels_are_zero_padded() {
    assert_eq!(SegmentId(7).label(), "segment-00007");
    assert_eq!(SegmentId(12345).label(), "segment-12345");
}

#[test]
fn paths_use_label_and_extension() {
    let dir = Path::new("/tmp/level0");
    let id = SegmentId::from(3);
    assert_eq!(id.data_path(dir), dir.join("segment-00003.seg"));
    assert_eq!(id.filter_path(dir), dir.join("segment-00003.xf"));
}

#[test]
fn labels_sort_like_ids() {
    let mut labels: Vec<String> = [9u64, 100, 20].iter().map(|i| SegmentId(*i).label()).collect();
    labels.sort();
    assert_eq!(labels, vec![
        SegmentId(9).label(),
        SegmentId(20).label(),
        SegmentId(100).label()
    ]);
}
