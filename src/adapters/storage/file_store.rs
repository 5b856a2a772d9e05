//! File Local Store - Snapshot-Persisted Local Storage
//!
//! Keeps every item in memory and rewrites one JSON snapshot on each
//! mutation, using a temporary file and a rename so the snapshot on disk
//! is always either the old or the new version. A write that cannot be
//! persisted is rolled back in memory.
//!
//! `LocalStore` is synchronous, so the snapshot write blocks the calling
//! task. Snapshots are small, and the adapter only reaches this store when
//! no primary is configured or the primary failed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info};

use super::memory::MemoryStore;
use crate::domain::error::StorageResult;
use crate::ports::kv_store::LocalStore;

/// `LocalStore` backed by a JSON snapshot file.
pub struct FileLocalStore {
    /// Live items.
    memory: MemoryStore,
    /// Path of the snapshot.
    path: PathBuf,
    /// Temporary path for atomic writes.
    tmp_path: PathBuf,
    /// Serializes mutate-then-persist sequences.
    write_lock: Mutex<()>,
}

impl FileLocalStore {
    /// Open the snapshot at `path`, creating parent directories.
    ///
    /// A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>, quota: Option<usize>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let items: BTreeMap<String, String> = if path.exists() {
            let json = std::fs::read_to_string(&path)?;
            serde_json::from_str(&json)?
        } else {
            info!(path = %path.display(), "No local storage snapshot, starting empty");
            BTreeMap::new()
        };

        info!(
            path = %path.display(),
            items = items.len(),
            "Local storage opened"
        );

        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        Ok(Self {
            memory: MemoryStore::from_items(items, quota),
            path,
            tmp_path,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> StorageResult<()> {
        let json = serde_json::to_string(&self.memory.snapshot())?;
        std::fs::write(&self.tmp_path, json)?;
        std::fs::rename(&self.tmp_path, &self.path)?;
        debug!(path = %self.path.display(), "Local storage snapshot written");
        Ok(())
    }
}

impl LocalStore for FileLocalStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.memory.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock();
        let previous = self.memory.insert(key, value)?;
        if let Err(e) = self.persist() {
            self.memory.restore(key, previous);
            return Err(e);
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock();
        let Some(previous) = self.memory.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.persist() {
            self.memory.restore(key, Some(previous));
            return Err(e);
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.memory.len()
    }

    fn key(&self, index: usize) -> Option<String> {
        self.memory.key(index)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.memory.keys_with_prefix(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::StorageError;

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("local.json");

        let store = FileLocalStore::open(&path, None).unwrap();
        store.set_item("letters:girlfriend:1", "{}").unwrap();
        store.set_item("letters:girlfriend:2", "{}").unwrap();
        store.remove_item("letters:girlfriend:1").unwrap();
        drop(store);

        let reopened = FileLocalStore::open(&path, None).unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.get_item("letters:girlfriend:2").as_deref(), Some("{}"));
        assert!(!dir.path().join("nested").join("local.json.tmp").exists());
    }

    #[test]
    fn test_prefix_scan_after_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        let store = FileLocalStore::open(&path, None).unwrap();
        store.set_item("letters:girlfriend:2", "{}").unwrap();
        store.set_item("letters:boyfriend:1", "{}").unwrap();
        store.set_item("letters:girlfriend:1", "{}").unwrap();
        drop(store);

        let reopened = FileLocalStore::open(&path, None).unwrap();
        assert_eq!(
            reopened.keys_with_prefix("letters:girlfriend:"),
            ["letters:girlfriend:1", "letters:girlfriend:2"]
        );
    }

    #[test]
    fn test_failed_snapshot_write_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        let store = FileLocalStore::open(nested.join("s.json"), None).unwrap();
        store.set_item("k", "v").unwrap();
        std::fs::remove_dir_all(&nested).unwrap();

        assert!(matches!(store.remove_item("k"), Err(StorageError::Io(_))));
        assert_eq!(store.get_item("k").as_deref(), Some("v"));
        assert!(matches!(store.set_item("k2", "v"), Err(StorageError::Io(_))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_quota_applies() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLocalStore::open(dir.path().join("s.json"), Some(8)).unwrap();
        store.set_item("k", "1234").unwrap();
        assert!(matches!(
            store.set_item("k2", "123456"),
            Err(StorageError::QuotaExceeded { .. })
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_corrupt_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            FileLocalStore::open(&path, None),
            Err(StorageError::Serialization(_))
        ));
    }
}
