use crate::engine::core::{Entry, SegmentId};
use crate::engine::errors::SegmentError;
use crate::shared::storage_header::{BinaryHeader, FileKind};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Sequential reader over one sealed segment. Yields the segment's
/// entries one on-disk node at a time; a `None` pull means the segment
/// is exhausted, after which the cursor must be closed and never read
/// again.
#[derive(Debug)]
pub struct SegmentCursor {
    id: SegmentId,
    path: PathBuf,
    file: File,
    /// Byte position of the next unread node.
    offset: u64,
    exhausted: bool,
}

/// Suspended form of a cursor: the path and the byte position of the
/// next unread node. Holds no file handle, so a hibernated merge keeps
/// no descriptors open on its inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorSnapshot {
    pub id: SegmentId,
    pub path: PathBuf,
    pub offset: u64,
    pub exhausted: bool,
}

impl SegmentCursor {
    pub fn open(dir: &Path, id: SegmentId) -> Result<Self, SegmentError> {
        let path = id.data_path(dir);
        let mut file = File::open(&path)?;

        let header = BinaryHeader::read_from(&mut file)?;
        if header.magic != FileKind::SegmentData.magic() {
            return Err(SegmentError::Corrupt(format!(
                "bad segment magic in {}",
                path.display()
            )));
        }

        debug!(target: "segforge::cursor", segment = %id, path = %path.display(), "Opened segment cursor");
        Ok(Self {
            id,
            path,
            file,
            offset: BinaryHeader::TOTAL_LEN as u64,
            exhausted: false,
        })
    }

    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// Reads the next node of entries. `Ok(None)` signals exhaustion.
    pub fn next_batch(&mut self) -> Result<Option<Vec<Entry>>, SegmentError> {
        if self.exhausted {
            return Ok(None);
        }

        let mut count_buf = [0u8; 4];
        match self.file.read_exact(&mut count_buf) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                self.exhausted = true;
                trace!(target: "segforge::cursor", segment = %self.id, "Cursor exhausted");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }
        self.offset += 4;

        let count = u32::from_le_bytes(count_buf);
        let mut batch = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let mut len_buf = [0u8; 4];
            self.file.read_exact(&mut len_buf).map_err(|e| {
                SegmentError::Corrupt(format!("truncated node in {}: {}", self.path.display(), e))
            })?;
            let len = u32::from_le_bytes(len_buf);

            let mut record = vec![0u8; len as usize];
            self.file.read_exact(&mut record).map_err(|e| {
                SegmentError::Corrupt(format!("truncated entry in {}: {}", self.path.display(), e))
            })?;

            batch.push(bincode::deserialize::<Entry>(&record)?);
            self.offset += 4 + len as u64;
        }

        trace!(
            target: "segforge::cursor",
            segment = %self.id,
            entries = batch.len(),
            offset = self.offset,
            "Read node"
        );
        Ok(Some(batch))
    }

    /// Releases the file handle. Called exactly once, after exhaustion
    /// or when the merge is torn down.
    pub fn close(self) {
        debug!(target: "segforge::cursor", segment = %self.id, "Closed segment cursor");
    }

    /// Drops the file handle, retaining only what `resume` needs.
    pub fn suspend(self) -> CursorSnapshot {
        debug!(
            target: "segforge::cursor",
            segment = %self.id,
            offset = self.offset,
            "Suspending segment cursor"
        );
        CursorSnapshot {
            id: self.id,
            path: self.path,
            offset: self.offset,
            exhausted: self.exhausted,
        }
    }
}

impl CursorSnapshot {
    /// Reopens the segment and seeks back to the retained position.
    /// The resumed cursor yields exactly the batches the suspended one
    /// would have.
    pub fn resume(self) -> Result<SegmentCursor, SegmentError> {
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(self.offset))?;
        debug!(
            target: "segforge::cursor",
            segment = %self.id,
            offset = self.offset,
            "Resumed segment cursor"
        );
        Ok(SegmentCursor {
            id: self.id,
            path: self.path,
            file,
            offset: self.offset,
            exhausted: self.exhausted,
        })
    }
}
