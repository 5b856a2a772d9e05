//! In-memory local store with an optional byte quota.
//!
//! Behaves like browser local storage: synchronous, ordered enumeration
//! by index, and a write that would exceed the quota is rejected.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::domain::error::{StorageError, StorageResult};
use crate::ports::kv_store::LocalStore;

#[derive(Debug, Default)]
struct Inner {
    items: BTreeMap<String, String>,
    /// Sum of key and value lengths over all items.
    bytes: usize,
}

/// Synchronous in-memory `LocalStore`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    quota: Option<usize>,
}

impl MemoryStore {
    /// Unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects writes past `quota` bytes.
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            inner: RwLock::default(),
            quota: Some(quota),
        }
    }

    /// Store pre-filled with `items`. The quota is only enforced on writes.
    #[must_use]
    pub fn from_items(items: BTreeMap<String, String>, quota: Option<usize>) -> Self {
        let bytes = items.iter().map(|(k, v)| k.len() + v.len()).sum();
        Self {
            inner: RwLock::new(Inner { items, bytes }),
            quota,
        }
    }

    /// Copy of every item.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.inner.read().items.clone()
    }

    /// Bytes currently held.
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.inner.read().bytes
    }

    /// Insert and return the previous value.
    pub(crate) fn insert(&self, key: &str, value: &str) -> StorageResult<Option<String>> {
        let mut inner = self.inner.write();
        let previous_len = inner.items.get(key).map_or(0, |old| key.len() + old.len());
        let needed = inner.bytes - previous_len + key.len() + value.len();
        if let Some(quota) = self.quota {
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }
        inner.bytes = needed;
        Ok(inner.items.insert(key.to_string(), value.to_string()))
    }

    /// Remove and return the previous value.
    pub(crate) fn remove(&self, key: &str) -> Option<String> {
        let mut inner = self.inner.write();
        let previous = inner.items.remove(key);
        if let Some(old) = &previous {
            inner.bytes -= key.len() + old.len();
        }
        previous
    }

    /// Put `key` back to `previous`, bypassing the quota.
    pub(crate) fn restore(&self, key: &str, previous: Option<String>) {
        let mut inner = self.inner.write();
        if let Some(old) = inner.items.remove(key) {
            inner.bytes -= key.len() + old.len();
        }
        if let Some(value) = previous {
            inner.bytes += key.len() + value.len();
            inner.items.insert(key.to_string(), value);
        }
    }
}

impl LocalStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.inner.read().items.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.insert(key, value).map(|_| ())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.remove(key);
        Ok(())
    }

    fn len(&self) -> usize {
        self.inner.read().items.len()
    }

    fn key(&self, index: usize) -> Option<String> {
        self.inner.read().items.keys().nth(index).cloned()
    }

    /// Ordered range scan from `prefix` under one read lock.
    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.inner
            .read()
            .items
            .range::<str, _>((std::ops::Bound::Included(prefix), std::ops::Bound::Unbounded))
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(prefix))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        store.set_item("a", "1").unwrap();
        assert_eq!(store.get_item("a").as_deref(), Some("1"));
        store.remove_item("a").unwrap();
        store.remove_item("a").unwrap();
        assert_eq!(store.get_item("a"), None);
        assert_eq!(store.used_bytes(), 0);
    }

    #[test]
    fn test_enumeration_by_index() {
        let store = MemoryStore::new();
        store.set_item("letters:girlfriend:2", "x").unwrap();
        store.set_item("letters:boyfriend:1", "x").unwrap();
        store.set_item("letters:girlfriend:1", "x").unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.key(3), None);
        let mut keys = store.keys_with_prefix("letters:girlfriend:");
        keys.sort();
        assert_eq!(keys, ["letters:girlfriend:1", "letters:girlfriend:2"]);
    }

    #[test]
    fn test_prefix_scan_matches_index_scan() {
        let store = MemoryStore::new();
        for key in [
            "letters:boyfriend:1",
            "letters:girlfriend:9",
            "letters:girlfriend:10",
            "letters:girlfriend;",
            "letters:girlfriend",
            "other",
        ] {
            store.set_item(key, "x").unwrap();
        }

        let by_index: Vec<String> = (0..store.len())
            .filter_map(|index| store.key(index))
            .filter(|key| key.starts_with("letters:girlfriend:"))
            .collect();
        let scanned = store.keys_with_prefix("letters:girlfriend:");
        assert_eq!(scanned, ["letters:girlfriend:10", "letters:girlfriend:9"]);
        assert_eq!(scanned, by_index);
        assert_eq!(store.keys_with_prefix("").len(), 6);
        assert!(store.keys_with_prefix("zzz").is_empty());
    }

    #[test]
    fn test_quota_rejects_and_keeps_old_value() {
        let store = MemoryStore::with_quota(10);
        store.set_item("k", "12345").unwrap();
        assert_eq!(store.used_bytes(), 6);
        // overwrite accounts for the replaced value
        store.set_item("k", "123456789").unwrap();
        let err = store.set_item("other", "12345678").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { quota: 10, .. }));
        assert_eq!(store.get_item("k").as_deref(), Some("123456789"));
        assert_eq!(store.get_item("other"), None);
    }

    #[test]
    fn test_restore() {
        let store = MemoryStore::new();
        store.set_item("k", "old").unwrap();
        let previous = store.insert("k", "new").unwrap();
        store.restore("k", previous);
        assert_eq!(store.get_item("k").as_deref(), Some("old"));
        store.restore("k", None);
        assert!(store.is_empty());
        assert_eq!(store.used_bytes(), 0);
    }
}
