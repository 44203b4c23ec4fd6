use crate::engine::errors::SegmentError;
use crate::shared::hash::stable_hash64;
use crate::shared::storage_header::{BinaryHeader, FileKind};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;
use xorf::{BinaryFuse8, Filter};

/// Approximate-membership sidecar over all keys of a sealed segment,
/// backed by a binary fuse filter. Built once from the key hashes the
/// builder accumulated; read-only afterwards.
#[derive(Clone, Debug)]
pub struct KeyFilter {
    inner: BinaryFuse8,
}

impl KeyFilter {
    pub fn build(key_hashes: &[u64]) -> Result<Self, SegmentError> {
        debug!(
            target: "segforge::key_filter",
            keys = key_hashes.len(),
            "Building key filter"
        );
        let inner = BinaryFuse8::try_from_iterator(key_hashes.iter().copied())
            .map_err(|e| SegmentError::FilterBuild(e.to_string()))?;
        Ok(Self { inner })
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.inner.contains(&stable_hash64(&key.to_vec()))
    }

    pub fn save(&self, path: &Path) -> Result<(), SegmentError> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        let mut writer = BufWriter::new(file);

        let data = bincode::serialize(&self.inner)?;
        let header = BinaryHeader::new(FileKind::KeyFilter.magic(), 1, 0);
        header.write_to(&mut writer)?;
        writer.write_all(&data)?;
        writer.flush()?;

        debug!(
            target: "segforge::key_filter",
            path = %path.display(),
            bytes = data.len(),
            "Saved key filter"
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, SegmentError> {
        let data = std::fs::read(path)?;
        let mut slice = &data[..];
        let header = BinaryHeader::read_from(&mut slice)?;
        if header.magic != FileKind::KeyFilter.magic() {
            return Err(SegmentError::Corrupt(format!(
                "bad key filter magic in {}",
                path.display()
            )));
        }
        let inner = bincode::deserialize(&data[BinaryHeader::TOTAL_LEN..])?;
        Ok(Self { inner })
    }
}
