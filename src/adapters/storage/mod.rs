//! Storage Adapters - Key-Value Providers and Fallback
//!
//! Concrete providers (`MemoryStore`, `FileLocalStore`,
//! `DirectoryProvider`) and the two `StorageAdapter` strategies that sit
//! on top of them. `select_adapter` picks the strategy once at startup.

pub mod directory;
pub mod fallback;
pub mod file_store;
pub mod memory;

use std::sync::Arc;

use tracing::info;

pub use directory::DirectoryProvider;
pub use fallback::{FallbackStorageAdapter, LocalStorageAdapter};
pub use file_store::FileLocalStore;
pub use memory::MemoryStore;

use crate::ports::kv_store::{KvProvider, LocalStore, StorageAdapter};

/// Choose the storage strategy for the given providers.
///
/// No primary is a normal condition and yields a local-only adapter.
pub fn select_adapter(
    primary: Option<Arc<dyn KvProvider>>,
    local: Arc<dyn LocalStore>,
) -> Arc<dyn StorageAdapter> {
    let adapter: Arc<dyn StorageAdapter> = match primary {
        Some(primary) => Arc::new(FallbackStorageAdapter::new(primary, local)),
        None => Arc::new(LocalStorageAdapter::new(local)),
    };
    info!(strategy = adapter.describe(), "Storage adapter selected");
    adapter
}
