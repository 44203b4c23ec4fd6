pub mod entry;
pub mod merge;
pub mod segment;

pub use entry::{Entry, Value};
pub use merge::snapshot::MergeSnapshot;
pub use merge::state::{MergeOptions, MergeSpec, MergeState, QuantumOutcome, UNBOUNDED_UNITS};
pub use segment::builder::{BuilderSnapshot, SegmentBuilder};
pub use segment::cursor::{CursorSnapshot, SegmentCursor};
pub use segment::key_filter::KeyFilter;
pub use segment::segment_id::SegmentId;
