use crate::engine::core::{Entry, SegmentBuilder, SegmentCursor, SegmentId};
use std::path::{Path, PathBuf};

/// Builds sealed on-disk segments for tests.
pub struct SegmentFactory {
    dir: PathBuf,
    id: u64,
    entries: Vec<Entry>,
    entries_per_node: usize,
}

impl SegmentFactory {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            id: 0,
            entries: Vec::new(),
            entries_per_node: 4,
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    pub fn with_entries(mut self, entries: Vec<Entry>) -> Self {
        self.entries = entries;
        self
    }

    pub fn with_entry(mut self, entry: Entry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn with_entries_per_node(mut self, entries_per_node: usize) -> Self {
        self.entries_per_node = entries_per_node;
        self
    }

    pub fn create(self) -> SegmentId {
        let id = SegmentId(self.id);
        let mut builder = SegmentBuilder::create(
            &self.dir,
            id,
            self.entries.len() as u64,
            self.entries_per_node,
        )
        .unwrap();
        for entry in self.entries {
            builder.add(entry).unwrap();
        }
        builder.close().unwrap();
        id
    }

    /// Reads a sealed segment back in full.
    pub fn read_all(dir: &Path, id: SegmentId) -> Vec<Entry> {
        let mut cursor = SegmentCursor::open(dir, id).unwrap();
        let mut out = Vec::new();
        while let Some(batch) = cursor.next_batch().unwrap() {
            out.extend(batch);
        }
        cursor.close();
        out
    }
}
