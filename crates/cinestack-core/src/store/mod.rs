//! Persisted key-value namespaces backing the session store.
//!
//! This module provides:
//! - `KeyValueStore`: the backing-store seam, with synchronous atomic commits
//! - `FileStore`: one JSON document per namespace on disk
//! - `MemoryStore`: an in-process map for tests and ephemeral use
//!
//! Writes are grouped into a `Batch` so that a multi-key update lands on
//! disk as a single unit.

pub mod error;
pub mod file;
pub mod memory;

use serde::{Deserialize, Serialize};

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;

/// A stored value. Only booleans and strings are supported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Edit {
    Put(String, Value),
    Remove(String),
}

/// A group of edits applied atomically by [`KeyValueStore::commit`].
///
/// If `clear` is set the namespace is emptied first, then the edits are
/// applied in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    pub(crate) clear: bool,
    pub(crate) edits: Vec<Edit>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every key in the namespace before applying the other edits
    pub fn clear(mut self) -> Self {
        self.clear = true;
        self
    }

    pub fn put_bool(mut self, key: &str, value: bool) -> Self {
        self.edits.push(Edit::Put(key.to_string(), Value::Bool(value)));
        self
    }

    pub fn put_string(mut self, key: &str, value: &str) -> Self {
        self.edits
            .push(Edit::Put(key.to_string(), Value::Str(value.to_string())));
        self
    }

    pub fn remove(mut self, key: &str) -> Self {
        self.edits.push(Edit::Remove(key.to_string()));
        self
    }

    pub fn is_empty(&self) -> bool {
        !self.clear && self.edits.is_empty()
    }

    /// Apply this batch to an in-memory map.
    pub(crate) fn apply_to(self, entries: &mut std::collections::BTreeMap<String, Value>) {
        if self.clear {
            entries.clear();
        }
        for edit in self.edits {
            match edit {
                Edit::Put(key, value) => {
                    entries.insert(key, value);
                }
                Edit::Remove(key) => {
                    entries.remove(&key);
                }
            }
        }
    }
}

/// A durable key-value namespace.
///
/// `commit` must apply the whole batch and make it durable before it
/// returns. Implementations may not defer or coalesce writes: once `commit`
/// returns `Ok`, a process crash must not lose the batch.
pub trait KeyValueStore {
    /// Name of the namespace this store is scoped to
    fn namespace(&self) -> &str;

    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    fn commit(&mut self, batch: Batch) -> Result<(), StoreError>;

    /// Read a boolean, falling back to `default` when absent or not a bool
    fn get_bool(&self, key: &str, default: bool) -> Result<bool, StoreError> {
        Ok(match self.get(key)? {
            Some(Value::Bool(b)) => b,
            _ => default,
        })
    }

    /// Read a string; a value of another type reads as absent
    fn get_string(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(match self.get(key)? {
            Some(Value::Str(s)) => Some(s),
            _ => None,
        })
    }
}
