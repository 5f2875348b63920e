use std::collections::BTreeMap;

use super::{Batch, KeyValueStore, StoreError, Value};

/// In-process namespace. Nothing survives the process; commits never fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    namespace: String,
    entries: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            entries: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn commit(&mut self, batch: Batch) -> Result<(), StoreError> {
        batch.apply_to(&mut self.entries);
        Ok(())
    }
}
