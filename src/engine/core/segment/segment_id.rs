use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Numeric identity of one immutable segment inside a data directory.
/// Rendered as a zero-padded label so directory listings sort naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId(pub u64);

impl SegmentId {
    pub fn label(&self) -> String {
        format!("segment-{:05}", self.0)
    }

    /// Path of the sorted entry file.
    pub fn data_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.seg", self.label()))
    }

    /// Path of the key-filter sidecar written when the segment is sealed.
    pub fn filter_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.xf", self.label()))
    }
}

impl From<u64> for SegmentId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
