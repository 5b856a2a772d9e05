//! Storage adapters over the primary and secondary providers.
//!
//! `LocalStorageAdapter` serves everything from the local store.
//! `FallbackStorageAdapter` asks the primary first and silently retries
//! on the local store when the primary errors. Which one is used is
//! decided once, when the diary is wired up.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{instrument, warn};

use crate::domain::error::StorageResult;
use crate::ports::kv_store::{Deletion, KeyList, KvEntry, KvProvider, LocalStore, StorageAdapter};

/// Adapter used when no primary provider exists.
pub struct LocalStorageAdapter {
    local: Arc<dyn LocalStore>,
}

impl LocalStorageAdapter {
    pub fn new(local: Arc<dyn LocalStore>) -> Self {
        Self { local }
    }
}

fn local_get(local: &dyn LocalStore, key: &str) -> Option<KvEntry> {
    local.get_item(key).map(|value| KvEntry::new(key, value))
}

fn local_set(local: &dyn LocalStore, key: &str, value: &str) -> StorageResult<Option<KvEntry>> {
    local.set_item(key, value)?;
    Ok(Some(KvEntry::new(key, value)))
}

fn local_delete(local: &dyn LocalStore, key: &str) -> StorageResult<Deletion> {
    local.remove_item(key)?;
    Ok(Deletion {
        key: key.to_string(),
        deleted: true,
    })
}

fn local_list(local: &dyn LocalStore, prefix: &str) -> KeyList {
    KeyList {
        keys: local.keys_with_prefix(prefix),
    }
}

#[async_trait]
impl StorageAdapter for LocalStorageAdapter {
    async fn get(&self, key: &str) -> StorageResult<Option<KvEntry>> {
        Ok(local_get(self.local.as_ref(), key))
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<Option<KvEntry>> {
        local_set(self.local.as_ref(), key, value)
    }

    async fn delete(&self, key: &str) -> StorageResult<Deletion> {
        local_delete(self.local.as_ref(), key)
    }

    async fn list(&self, prefix: &str) -> StorageResult<KeyList> {
        Ok(local_list(self.local.as_ref(), prefix))
    }

    fn describe(&self) -> &'static str {
        "local"
    }
}

/// Adapter that prefers the primary and falls back to the local store.
///
/// A primary error is logged and the same operation is replayed on the
/// local store. If that fails too, the local store's error is returned.
pub struct FallbackStorageAdapter {
    primary: Arc<dyn KvProvider>,
    local: Arc<dyn LocalStore>,
}

impl FallbackStorageAdapter {
    pub fn new(primary: Arc<dyn KvProvider>, local: Arc<dyn LocalStore>) -> Self {
        Self { primary, local }
    }
}

#[async_trait]
impl StorageAdapter for FallbackStorageAdapter {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> StorageResult<Option<KvEntry>> {
        match self.primary.get(key).await {
            Ok(entry) => Ok(entry),
            Err(e) => {
                warn!(error = %e, "Primary get failed, using local storage");
                Ok(local_get(self.local.as_ref(), key))
            }
        }
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    async fn set(&self, key: &str, value: &str) -> StorageResult<Option<KvEntry>> {
        match self.primary.set(key, value).await {
            Ok(entry) => Ok(entry),
            Err(e) => {
                warn!(error = %e, "Primary set failed, using local storage");
                local_set(self.local.as_ref(), key, value)
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> StorageResult<Deletion> {
        match self.primary.delete(key).await {
            Ok(Some(deletion)) => Ok(deletion),
            // The key is absent afterwards either way.
            Ok(None) => Ok(Deletion {
                key: key.to_string(),
                deleted: true,
            }),
            Err(e) => {
                warn!(error = %e, "Primary delete failed, using local storage");
                local_delete(self.local.as_ref(), key)
            }
        }
    }

    #[instrument(skip(self))]
    async fn list(&self, prefix: &str) -> StorageResult<KeyList> {
        match self.primary.list(prefix).await {
            Ok(list) => Ok(list),
            Err(e) => {
                warn!(error = %e, "Primary list failed, scanning local storage");
                Ok(local_list(self.local.as_ref(), prefix))
            }
        }
    }

    fn describe(&self) -> &'static str {
        "primary+local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::memory::MemoryStore;
    use crate::domain::error::StorageError;

    /// Primary that fails every call.
    struct DownProvider;

    #[async_trait]
    impl KvProvider for DownProvider {
        async fn get(&self, _key: &str) -> StorageResult<Option<KvEntry>> {
            Err(StorageError::provider("primary", "offline"))
        }
        async fn set(&self, _key: &str, _value: &str) -> StorageResult<Option<KvEntry>> {
            Err(StorageError::provider("primary", "offline"))
        }
        async fn delete(&self, _key: &str) -> StorageResult<Option<Deletion>> {
            Err(StorageError::provider("primary", "offline"))
        }
        async fn list(&self, _prefix: &str) -> StorageResult<KeyList> {
            Err(StorageError::provider("primary", "offline"))
        }
    }

    #[tokio::test]
    async fn test_local_only_round_trip() {
        let adapter = LocalStorageAdapter::new(Arc::new(MemoryStore::new()));
        let stored = adapter.set("letters:girlfriend:1", "v").await.unwrap();
        assert_eq!(stored, Some(KvEntry::new("letters:girlfriend:1", "v")));
        let entry = adapter.get("letters:girlfriend:1").await.unwrap();
        assert_eq!(entry.map(|e| e.value).as_deref(), Some("v"));
        assert_eq!(adapter.get("missing").await.unwrap(), None);
        assert_eq!(adapter.describe(), "local");
    }

    #[tokio::test]
    async fn test_down_primary_is_silent() {
        let local = Arc::new(MemoryStore::new());
        let adapter = FallbackStorageAdapter::new(Arc::new(DownProvider), local.clone());

        adapter.set("letters:boyfriend:9", "hi").await.unwrap();
        assert_eq!(local.get_item("letters:boyfriend:9").as_deref(), Some("hi"));
        let entry = adapter.get("letters:boyfriend:9").await.unwrap().unwrap();
        assert_eq!(entry.value, "hi");
        assert_eq!(
            adapter.list("letters:boyfriend:").await.unwrap().keys,
            ["letters:boyfriend:9"]
        );
        assert!(adapter.delete("letters:boyfriend:9").await.unwrap().deleted);
        assert!(local.is_empty());
    }

    #[tokio::test]
    async fn test_both_down_surfaces_local_error() {
        let local = Arc::new(MemoryStore::with_quota(4));
        let adapter = FallbackStorageAdapter::new(Arc::new(DownProvider), local);
        let err = adapter.set("long-key", "long-value").await.unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
        // list still answers from the local scan
        assert!(adapter.list("x").await.unwrap().keys.is_empty());
    }
}
