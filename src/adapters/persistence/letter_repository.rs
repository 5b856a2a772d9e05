//! KV Letter Repository - Letters on Top of a Storage Adapter
//!
//! Implements the `LetterRepository` port by mapping each letter to the
//! key `letters:{to}:{id}` with its JSON form as the value. Listing
//! re-reads the whole recipient prefix on every call: there is no cache
//! and no index, which bounds this to personal-diary sized sets.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures_util::future::join_all;
use tracing::{debug, info, instrument, warn};

use crate::domain::error::{DiaryError, DiaryResult};
use crate::domain::letter::{self, Letter, LetterDraft, Participant};
use crate::ports::kv_store::StorageAdapter;
use crate::ports::repository::LetterRepository;

/// Letter repository over any `StorageAdapter`.
pub struct KvLetterRepository {
    storage: Arc<dyn StorageAdapter>,
}

impl KvLetterRepository {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    /// Fetch and parse one key. `None` for missing, empty or corrupt values.
    async fn load_one(&self, key: String) -> Option<Letter> {
        let entry = match self.storage.get(&key).await {
            Ok(Some(entry)) if !entry.value.is_empty() => entry,
            Ok(_) => {
                debug!(key = %key, "Listed key has no value");
                return None;
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Skipping unreadable letter");
                return None;
            }
        };

        match Letter::from_json(&key, &entry.value) {
            Ok(letter) => Some(letter),
            Err(e) => {
                warn!(error = %e, "Skipping malformed letter record");
                None
            }
        }
    }
}

#[async_trait]
impl LetterRepository for KvLetterRepository {
    #[instrument(skip(self, recipient), fields(recipient = recipient.as_str()))]
    async fn list_letters(&self, recipient: Participant) -> Vec<Letter> {
        let prefix = letter::recipient_prefix(recipient);
        let keys = match self.storage.list(&prefix).await {
            Ok(list) => list.keys,
            Err(e) => {
                warn!(error = %e, "Listing letters failed, showing none");
                return Vec::new();
            }
        };

        let listed = keys.len();
        let mut letters: Vec<Letter> = join_all(keys.into_iter().map(|key| self.load_one(key)))
            .await
            .into_iter()
            .flatten()
            .collect();
        letter::sort_newest_first(&mut letters);

        debug!(listed, loaded = letters.len(), "Letters loaded");
        letters
    }

    #[instrument(skip(self, title, content), fields(from = author.as_str(), to = recipient.as_str()))]
    async fn save_letter(
        &self,
        author: Participant,
        recipient: Participant,
        title: &str,
        content: &str,
    ) -> DiaryResult<Letter> {
        let draft = LetterDraft::new(title, content)?;
        let letter = Letter::compose(draft, author, recipient, Utc::now());
        let key = letter.storage_key();
        let json = letter.to_json().map_err(|e| {
            DiaryError::unconfirmed(format!("Failed to serialize letter: {e}"))
        })?;

        match self.storage.set(&key, &json).await {
            Ok(Some(_)) => {
                info!(id = %letter.id, "Letter saved");
                Ok(letter)
            }
            Ok(None) => Err(DiaryError::unconfirmed(
                "Failed to save letter: storage did not confirm the write",
            )),
            Err(e) => Err(DiaryError::persistence("Failed to save letter", e)),
        }
    }

    #[instrument(skip(self, recipient), fields(recipient = recipient.as_str()))]
    async fn delete_letter(&self, recipient: Participant, id: &str) -> DiaryResult<()> {
        let key = letter::letter_key(recipient, id);
        self.storage
            .delete(&key)
            .await
            .map_err(|e| DiaryError::persistence("Failed to delete letter", e))?;
        info!(id, "Letter deleted");
        Ok(())
    }
}
