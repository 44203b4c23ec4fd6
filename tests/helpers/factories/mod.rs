mod entry_factory;
mod segment_factory;

pub use entry_factory::EntryFactory;
pub use segment_factory::SegmentFactory;
