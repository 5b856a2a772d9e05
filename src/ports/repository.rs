//! Letter Repository Port - Diary Persistence Interface
//!
//! The operations the front-end calls to save, list and delete letters.
//! Adapters map these onto a key-value store; the session layer only
//! knows this trait.

use async_trait::async_trait;

use crate::domain::error::DiaryResult;
use crate::domain::letter::{Letter, Participant};

/// Trait for letter persistence.
#[async_trait]
pub trait LetterRepository: Send + Sync + 'static {
  /// All letters filed under `recipient`, newest first.
  ///
  /// Never fails: an unreadable diary lists as empty and unreadable
  /// records are skipped.
  async fn list_letters(&self, recipient: Participant) -> Vec<Letter>;

  /// Validate, stamp and store a new letter from `author` to `recipient`.
  async fn save_letter(
    &self,
    author: Participant,
    recipient: Participant,
    title: &str,
    content: &str,
  ) -> DiaryResult<Letter>;

  /// Remove a letter. Deleting an unknown id succeeds.
  async fn delete_letter(&self, recipient: Participant, id: &str) -> DiaryResult<()>;
}
