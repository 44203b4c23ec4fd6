use serde::{Deserialize, Serialize};

/// Payload of one key: either opaque bytes or a deletion marker.
///
/// Tombstones travel through merges untouched until they reach the last
/// level, where no older data can exist beneath them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Data(Vec<u8>),
    Tombstone,
}

/// One key/value pair inside a segment. Keys are compared byte-wise and
/// are unique and strictly increasing within a segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub key: Vec<u8>,
    pub value: Value,
}

impl Entry {
    pub fn new(key: Vec<u8>, value: Value) -> Self {
        Self { key, value }
    }

    pub fn data(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: Value::Data(value.into()),
        }
    }

    pub fn tombstone(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: Value::Tombstone,
        }
    }

    pub fn is_tombstone(&self) -> bool {
        matches!(self.value, Value::Tombstone)
    }
}
