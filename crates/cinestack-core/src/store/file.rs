use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Batch, KeyValueStore, StoreError, Value};

/// A namespace persisted as `<dir>/<namespace>.json`.
///
/// The document is read once on open and kept in memory. Each commit writes
/// the full document to a temp file, syncs it, then renames it over the old
/// one, so readers after a crash see either the previous or the new state.
#[derive(Debug)]
pub struct FileStore {
    namespace: String,
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl FileStore {
    /// Open the namespace under `dir`. A missing file is an empty namespace.
    pub fn open(dir: impl AsRef<Path>, namespace: &str) -> Result<Self, StoreError> {
        let path = dir.as_ref().join(format!("{}.json", namespace));
        let entries: BTreeMap<String, Value> = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
            serde_json::from_str(&contents).map_err(|e| StoreError::corrupt(&path, e))?
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), keys = entries.len(), "Opened store");

        Ok(Self {
            namespace: namespace.to_string(),
            path,
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(&self, entries: &BTreeMap<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let contents = serde_json::to_string_pretty(entries)
            .map_err(|e| StoreError::corrupt(&self.path, e))?;

        let tmp = self.path.with_extension("json.tmp");
        let written = File::create(&tmp).and_then(|mut file| {
            file.write_all(contents.as_bytes())?;
            file.sync_all()
        });
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::io(&tmp, e));
        }

        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::io(&self.path, e));
        }

        self.sync_parent()
    }

    /// Flush the directory entry so the rename itself is durable
    #[cfg(unix)]
    fn sync_parent(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            File::open(parent)
                .and_then(|dir| dir.sync_all())
                .map_err(|e| StoreError::io(parent, e))?;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_parent(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn commit(&mut self, batch: Batch) -> Result<(), StoreError> {
        let mut next = self.entries.clone();
        batch.apply_to(&mut next);

        // In-memory state only moves once the disk write has landed
        self.write_atomic(&next)?;
        self.entries = next;

        debug!(path = %self.path.display(), keys = self.entries.len(), "Committed store");
        Ok(())
    }
}
