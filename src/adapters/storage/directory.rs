//! Directory Provider - One File per Key
//!
//! Asynchronous `KvProvider` that stores each key as a file named by the
//! URL-safe base64 encoding of the key. Writes go to a temporary file
//! first and are renamed into place, so each key is replaced atomically.
//! Every write gets its own temporary name, so overlapping writes to the
//! same key never share a file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tokio::fs;
use tracing::{debug, instrument, warn};

use crate::domain::error::StorageResult;
use crate::ports::kv_store::{Deletion, KeyList, KvEntry, KvProvider};

const VALUE_EXT: &str = "val";
const TMP_EXT: &str = "tmp";

/// Directory-backed primary provider.
pub struct DirectoryProvider {
    dir: PathBuf,
    /// Suffix source for temporary file names.
    write_seq: AtomicU64,
}

impl DirectoryProvider {
    /// Use `dir` for storage, creating it if needed.
    pub async fn new(dir: impl AsRef<Path>) -> StorageResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            write_seq: AtomicU64::new(0),
        })
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{VALUE_EXT}", URL_SAFE_NO_PAD.encode(key)))
    }

    /// Unique temporary path next to `path`, e.g. `<b64>.7.tmp`.
    fn tmp_path(&self, path: &Path) -> PathBuf {
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        path.with_extension(format!("{seq}.{TMP_EXT}"))
    }

    fn decode_key(path: &Path) -> Option<String> {
        if path.extension()? != VALUE_EXT {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        let bytes = URL_SAFE_NO_PAD.decode(stem).ok()?;
        String::from_utf8(bytes).ok()
    }
}

#[async_trait]
impl KvProvider for DirectoryProvider {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> StorageResult<Option<KvEntry>> {
        match fs::read_to_string(self.value_path(key)).await {
            Ok(value) => Ok(Some(KvEntry::new(key, value))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    async fn set(&self, key: &str, value: &str) -> StorageResult<Option<KvEntry>> {
        let path = self.value_path(key);
        let tmp_path = self.tmp_path(&path);
        fs::write(&tmp_path, value).await?;
        if let Err(e) = fs::rename(&tmp_path, &path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        debug!("Value written");
        Ok(Some(KvEntry::new(key, value)))
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> StorageResult<Option<Deletion>> {
        match fs::remove_file(self.value_path(key)).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        Ok(Some(Deletion {
            key: key.to_string(),
            deleted: true,
        }))
    }

    #[instrument(skip(self))]
    async fn list(&self, prefix: &str) -> StorageResult<KeyList> {
        let mut keys = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            match Self::decode_key(&path) {
                Some(key) if key.starts_with(prefix) => keys.push(key),
                Some(_) => {}
                None => {
                    if path.extension().is_some_and(|ext| ext == VALUE_EXT) {
                        warn!(file = %path.display(), "Skipping undecodable key file");
                    }
                }
            }
        }

        Ok(KeyList { keys })
    }
}
