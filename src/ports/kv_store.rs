//! Key-Value Store Ports - Provider and Adapter Interfaces
//!
//! Three traits live here:
//! - `KvProvider`: an asynchronous host-supplied store (the primary).
//!   It may be missing entirely, and any call may fail.
//! - `LocalStore`: a synchronous local store with index-based
//!   enumeration (the secondary).
//! - `StorageAdapter`: the uniform four-operation interface the letter
//!   repository depends on, regardless of which provider answers.

use async_trait::async_trait;

use crate::domain::error::StorageResult;

/// A stored key and its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvEntry {
  /// Key the value is stored under.
  pub key: String,
  /// Pre-serialized value.
  pub value: String,
}

impl KvEntry {
  pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      key: key.into(),
      value: value.into(),
    }
  }
}

/// Acknowledgement of a delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deletion {
  /// Key that was removed.
  pub key: String,
  /// Whether the key is gone. True even if it never existed.
  pub deleted: bool,
}

/// Keys matching a listing prefix. Order is unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyList {
  pub keys: Vec<String>,
}

/// Asynchronous host-supplied key-value service.
///
/// `get` returns `None` for a missing key. `set` and `delete` may return
/// `None` when the host does not confirm the operation.
#[async_trait]
pub trait KvProvider: Send + Sync + 'static {
  /// Fetch a value.
  async fn get(&self, key: &str) -> StorageResult<Option<KvEntry>>;

  /// Store a value, returning what was stored.
  async fn set(&self, key: &str, value: &str) -> StorageResult<Option<KvEntry>>;

  /// Remove a key.
  async fn delete(&self, key: &str) -> StorageResult<Option<Deletion>>;

  /// Keys starting with `prefix`.
  async fn list(&self, prefix: &str) -> StorageResult<KeyList>;
}

/// Synchronous local key-value store.
///
/// Mirrors browser-style local storage: item access by key and key
/// enumeration by index.
pub trait LocalStore: Send + Sync + 'static {
  /// Value stored under `key`.
  fn get_item(&self, key: &str) -> Option<String>;

  /// Store `value` under `key`.
  fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

  /// Remove `key`. Removing a missing key is a no-op.
  fn remove_item(&self, key: &str) -> StorageResult<()>;

  /// Number of stored keys.
  fn len(&self) -> usize;

  /// Key at position `index`, if any.
  fn key(&self, index: usize) -> Option<String>;

  /// Whether the store holds no keys.
  fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Scan every index and keep keys starting with `prefix`.
  fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
    (0..self.len())
      .filter_map(|index| self.key(index))
      .filter(|key| key.starts_with(prefix))
      .collect()
  }
}

/// Uniform storage interface used by the letter repository.
///
/// Implementations absorb provider selection and fallback. Only a
/// failure with no remaining provider reaches the caller.
#[async_trait]
pub trait StorageAdapter: Send + Sync + 'static {
  /// Fetch a value; `None` if absent.
  async fn get(&self, key: &str) -> StorageResult<Option<KvEntry>>;

  /// Store a value; `None` if the store did not confirm it.
  async fn set(&self, key: &str, value: &str) -> StorageResult<Option<KvEntry>>;

  /// Remove a key. Idempotent.
  async fn delete(&self, key: &str) -> StorageResult<Deletion>;

  /// Keys starting with `prefix`.
  async fn list(&self, prefix: &str) -> StorageResult<KeyList>;

  /// Short name of the active strategy, for logs.
  fn describe(&self) -> &'static str;
}
