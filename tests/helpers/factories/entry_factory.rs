use crate::engine::core::{Entry, Value};
use rand::Rng;

pub struct EntryFactory {
    key: Vec<u8>,
    value: Value,
}

impl EntryFactory {
    pub fn new() -> Self {
        Self {
            key: b"key-000".to_vec(),
            value: Value::Data(b"value".to_vec()),
        }
    }

    pub fn with_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_value(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.value = Value::Data(value.into());
        self
    }

    pub fn tombstone(mut self) -> Self {
        self.value = Value::Tombstone;
        self
    }

    pub fn create(self) -> Entry {
        Entry::new(self.key, self.value)
    }

    /// Builds `count` entries with sequential keys and random payloads,
    /// already in strictly increasing key order.
    pub fn create_list(count: usize) -> Vec<Entry> {
        let mut rng = rand::thread_rng();
        (0..count)
            .map(|i| {
                let payload: u64 = rng.gen_range(0..1_000_000);
                Entry::data(format!("key-{:04}", i), payload.to_string())
            })
            .collect()
    }
}
