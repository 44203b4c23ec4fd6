use crate::engine::core::{Entry, KeyFilter, SegmentId};
use crate::engine::errors::SegmentError;
use crate::shared::hash::stable_hash64;
use crate::shared::storage_header::{BinaryHeader, FileKind};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Incremental writer for a new segment. Entries must arrive in strictly
/// increasing key order; they are buffered into fixed-size nodes and
/// appended to the data file. `close` seals the segment and writes the
/// key-filter sidecar.
pub struct SegmentBuilder {
    id: SegmentId,
    dir: PathBuf,
    writer: BufWriter<std::fs::File>,
    /// Entries buffered for the next node flush.
    node: Vec<Entry>,
    entries_per_node: usize,
    count: u64,
    last_key: Option<Vec<u8>>,
    key_hashes: Vec<u64>,
    /// Bytes durably laid out in the data file (full nodes only).
    bytes_written: u64,
}

/// Suspended form of a builder. Carries the not-yet-flushed node and the
/// accumulated filter hashes so resuming continues exactly where the
/// live builder stopped, with no file handle held in between.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuilderSnapshot {
    pub id: SegmentId,
    pub dir: PathBuf,
    pub count: u64,
    pub last_key: Option<Vec<u8>>,
    pub key_hashes: Vec<u64>,
    pub pending: Vec<Entry>,
    pub bytes_written: u64,
    pub entries_per_node: usize,
}

impl SegmentBuilder {
    pub fn create(
        dir: &Path,
        id: SegmentId,
        size_hint: u64,
        entries_per_node: usize,
    ) -> Result<Self, SegmentError> {
        std::fs::create_dir_all(dir)?;
        let path = id.data_path(dir);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        let mut writer = BufWriter::new(file);

        BinaryHeader::new(FileKind::SegmentData.magic(), 1, 0).write_to(&mut writer)?;

        info!(
            target: "segforge::builder",
            segment = %id,
            path = %path.display(),
            size_hint,
            "Created segment builder"
        );
        Ok(Self {
            id,
            dir: dir.to_path_buf(),
            writer,
            node: Vec::with_capacity(entries_per_node),
            entries_per_node,
            count: 0,
            last_key: None,
            key_hashes: Vec::with_capacity(size_hint as usize),
            bytes_written: BinaryHeader::TOTAL_LEN as u64,
        })
    }

    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// Number of entries accepted so far, flushed or pending.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Appends one entry. Keys must be strictly increasing.
    pub fn add(&mut self, entry: Entry) -> Result<(), SegmentError> {
        if let Some(last) = &self.last_key {
            if entry.key <= *last {
                return Err(SegmentError::OutOfOrderKey(format!(
                    "segment {}: key {:?} after {:?}",
                    self.id, entry.key, last
                )));
            }
        }

        self.key_hashes.push(stable_hash64(&entry.key));
        self.last_key = Some(entry.key.clone());
        self.node.push(entry);
        self.count += 1;

        if self.node.len() >= self.entries_per_node {
            self.flush_node()?;
        }
        Ok(())
    }

    fn flush_node(&mut self) -> Result<(), SegmentError> {
        if self.node.is_empty() {
            return Ok(());
        }

        let count = self.node.len() as u32;
        self.writer.write_all(&count.to_le_bytes())?;
        self.bytes_written += 4;

        for entry in self.node.drain(..) {
            let bytes = bincode::serialize(&entry)?;
            let len = bytes.len() as u32;
            self.writer.write_all(&len.to_le_bytes())?;
            self.writer.write_all(&bytes)?;
            self.bytes_written += 4 + len as u64;
        }

        debug!(
            target: "segforge::builder",
            segment = %self.id,
            entries = count,
            bytes_written = self.bytes_written,
            "Flushed node"
        );
        Ok(())
    }

    /// Seals the segment: flushes the tail node, finishes the data file
    /// and writes the key-filter sidecar. Returns the final entry count.
    pub fn close(mut self) -> Result<u64, SegmentError> {
        self.flush_node()?;
        self.writer.flush()?;

        // An empty segment gets no filter sidecar; nothing to probe for.
        if !self.key_hashes.is_empty() {
            let filter = KeyFilter::build(&self.key_hashes)?;
            filter.save(&self.id.filter_path(&self.dir))?;
        }

        info!(
            target: "segforge::builder",
            segment = %self.id,
            entries = self.count,
            "Sealed segment"
        );
        Ok(self.count)
    }

    /// Drops the file handle without sealing. The pending node rides in
    /// the snapshot so the resumed builder lays out nodes exactly as an
    /// uninterrupted one would.
    pub fn suspend(mut self) -> Result<BuilderSnapshot, SegmentError> {
        self.writer.flush()?;
        debug!(
            target: "segforge::builder",
            segment = %self.id,
            pending = self.node.len(),
            "Suspending segment builder"
        );
        Ok(BuilderSnapshot {
            id: self.id,
            dir: self.dir,
            count: self.count,
            last_key: self.last_key,
            key_hashes: self.key_hashes,
            pending: self.node,
            bytes_written: self.bytes_written,
            entries_per_node: self.entries_per_node,
        })
    }
}

impl BuilderSnapshot {
    pub fn resume(self) -> Result<SegmentBuilder, SegmentError> {
        let path = self.id.data_path(&self.dir);
        let mut file = OpenOptions::new().write(true).open(&path)?;
        file.seek(SeekFrom::Start(self.bytes_written))?;

        debug!(
            target: "segforge::builder",
            segment = %self.id,
            bytes_written = self.bytes_written,
            pending = self.pending.len(),
            "Resumed segment builder"
        );
        Ok(SegmentBuilder {
            id: self.id,
            dir: self.dir,
            writer: BufWriter::new(file),
            node: self.pending,
            entries_per_node: self.entries_per_node,
            count: self.count,
            last_key: self.last_key,
            key_hashes: self.key_hashes,
            bytes_written: self.bytes_written,
        })
    }
}
