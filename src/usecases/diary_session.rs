//! Diary Session - One Visit to the Diary
//!
//! Drives the view-state machine and calls into the letter repository:
//! - Opening a diary loads its letters
//! - Saving validates, writes, reloads and returns to the action menu
//! - Deleting reloads and closes the letter if it was open
//! - Opening a letter runs one ribbon + heart round before the reveal
//!
//! Repository errors are returned to the caller unchanged so the
//! front-end can show them and let the user retry.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument};

use crate::config::UnlockConfig;
use crate::domain::error::{DiaryError, DiaryResult};
use crate::domain::letter::{Letter, Participant};
use crate::domain::unlock::{HeartGame, Ribbon, UnlockOutcome, UnlockRules};
use crate::domain::view::{self, ViewEvent, ViewState};
use crate::ports::repository::LetterRepository;

/// State of one visit: current screen, loaded letters, current game.
pub struct DiarySession<R: LetterRepository> {
  /// Letter persistence port.
  repository: Arc<R>,
  /// Mini-game rules.
  rules: UnlockRules,
  /// Current screen.
  view: ViewState,
  /// Letters of the open diary, newest first.
  letters: Vec<Letter>,
  /// Ribbon of the opened letter.
  ribbon: Option<Ribbon>,
  /// Heart round in progress or just finished.
  game: Option<HeartGame>,
}

impl<R: LetterRepository> DiarySession<R> {
  /// Start at visitor selection.
  pub fn new(repository: Arc<R>, config: &UnlockConfig) -> Self {
    Self {
      repository,
      rules: config.rules(),
      view: ViewState::SelectVisitor,
      letters: Vec::new(),
      ribbon: None,
      game: None,
    }
  }

  pub const fn view(&self) -> &ViewState {
    &self.view
  }

  /// Letters of the open diary as of the last load.
  pub fn letters(&self) -> &[Letter] {
    &self.letters
  }

  pub const fn ribbon(&self) -> Option<&Ribbon> {
    self.ribbon.as_ref()
  }

  pub const fn game(&self) -> Option<&HeartGame> {
    self.game.as_ref()
  }

  /// Outcome of the finished round, on the reveal screen.
  pub fn outcome(&self) -> Option<UnlockOutcome> {
    match self.view {
      ViewState::Reveal { .. } => self.game.as_ref().and_then(HeartGame::outcome),
      _ => None,
    }
  }

  /// The opened letter, if it is still loaded.
  pub fn selected_letter(&self) -> Option<&Letter> {
    let id = self.view.open_letter()?;
    self.letters.iter().find(|letter| letter.id == id)
  }

  pub fn choose_visitor(&mut self, visitor: Participant) {
    self.apply(ViewEvent::ChooseVisitor(visitor));
  }

  /// Open `profile`'s diary and load its letters.
  pub async fn choose_profile(&mut self, profile: Participant) {
    self.apply(ViewEvent::ChooseProfile(profile));
    self.refresh().await;
  }

  pub fn choose_write(&mut self) {
    self.apply(ViewEvent::ChooseWrite);
  }

  /// Show the letter list, reloading it first.
  pub async fn choose_read(&mut self) {
    self.apply(ViewEvent::ChooseRead);
    self.refresh().await;
  }

  pub fn back(&mut self) {
    self.apply(ViewEvent::Back);
    if self.view.open_letter().is_none() {
      self.clear_round();
    }
  }

  /// Return to visitor selection and forget everything loaded.
  pub fn reset(&mut self) {
    self.apply(ViewEvent::Reset);
    self.letters.clear();
    self.clear_round();
  }

  /// Reload the open diary's letters.
  pub async fn refresh(&mut self) {
    if let Some((_, profile)) = self.view.selection() {
      self.letters = self.repository.list_letters(profile).await;
      debug!(count = self.letters.len(), "Letters refreshed");
    }
  }

  /// Save the letter being written, then return to the action menu.
  ///
  /// On error the session stays on the write screen.
  #[instrument(skip(self, title, content))]
  pub async fn save_letter(&mut self, title: &str, content: &str) -> DiaryResult<Letter> {
    let ViewState::Write { visitor, profile } = self.view else {
      return Err(DiaryError::validation("Choose write before saving a letter"));
    };

    let letter = self
      .repository
      .save_letter(visitor, profile, title, content)
      .await?;
    self.apply(ViewEvent::LetterSaved);
    self.refresh().await;
    Ok(letter)
  }

  /// Delete a letter from the open diary.
  #[instrument(skip(self))]
  pub async fn delete_letter(&mut self, id: &str) -> DiaryResult<()> {
    let Some((_, profile)) = self.view.selection() else {
      return Err(DiaryError::validation("Open a diary before deleting letters"));
    };

    self.repository.delete_letter(profile, id).await?;
    let was_open = self.view.open_letter() == Some(id);
    self.apply(ViewEvent::LetterDeleted(id.to_string()));
    if was_open {
      self.clear_round();
    }
    self.refresh().await;
    Ok(())
  }

  /// Open a loaded letter, sealed behind a fresh ribbon.
  ///
  /// Returns false if no loaded letter has this id.
  pub fn open_letter(&mut self, id: &str) -> bool {
    if !self.letters.iter().any(|letter| letter.id == id) {
      return false;
    }
    self.apply(ViewEvent::OpenLetter(id.to_string()));
    let opened = self.view.open_letter() == Some(id);
    if opened {
      self.start_round();
    }
    opened
  }

  /// Drag the ribbon. Pulling it starts the heart round.
  pub fn drag_ribbon(&mut self, offset: i64) -> bool {
    if !matches!(self.view, ViewState::RibbonPull { .. }) {
      return false;
    }
    let Some(ribbon) = self.ribbon.as_mut() else {
      return false;
    };
    if !ribbon.drag(offset) {
      return false;
    }
    self.apply(ViewEvent::RibbonPulled);
    self.game = Some(HeartGame::new(self.rules));
    true
  }

  /// Tap the heart. Reaching the threshold finishes the round.
  pub fn tap(&mut self) -> bool {
    if !matches!(self.view, ViewState::Game { .. }) {
      return false;
    }
    let counted = self.game.as_mut().is_some_and(HeartGame::tap);
    self.finish_if_complete();
    counted
  }

  /// Advance the round clock. Running out of time finishes the round.
  pub fn tick(&mut self, elapsed: Duration) {
    if !matches!(self.view, ViewState::Game { .. }) {
      return;
    }
    if let Some(game) = self.game.as_mut() {
      game.tick(elapsed);
    }
    self.finish_if_complete();
  }

  /// Seal the revealed letter again for another round.
  pub fn play_again(&mut self) {
    if matches!(self.view, ViewState::Reveal { .. }) {
      self.apply(ViewEvent::PlayAgain);
      self.start_round();
    }
  }

  fn finish_if_complete(&mut self) {
    let Some(outcome) = self.game.as_ref().and_then(HeartGame::outcome) else {
      return;
    };
    self.apply(ViewEvent::GameFinished);
    info!(taps = outcome.taps, success = outcome.success, "Letter unlocked");
  }

  fn start_round(&mut self) {
    self.ribbon = Some(Ribbon::new(self.rules.ribbon_pull_distance));
    self.game = None;
  }

  fn clear_round(&mut self) {
    self.ribbon = None;
    self.game = None;
  }

  fn apply(&mut self, event: ViewEvent) {
    let next = view::transition(&self.view, event);
    if next != self.view {
      debug!(from = ?self.view, to = ?next, "View changed");
      self.view = next;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::adapters::persistence::KvLetterRepository;
  use crate::adapters::storage::{LocalStorageAdapter, MemoryStore};

  fn session() -> DiarySession<KvLetterRepository> {
    let adapter = Arc::new(LocalStorageAdapter::new(Arc::new(MemoryStore::new())));
    let config = UnlockConfig {
      tap_threshold: 3,
      ..UnlockConfig::default()
    };
    DiarySession::new(Arc::new(KvLetterRepository::new(adapter)), &config)
  }

  async fn write_one(session: &mut DiarySession<KvLetterRepository>) -> Letter {
    session.choose_visitor(Participant::Boyfriend);
    session.choose_profile(Participant::Girlfriend).await;
    session.choose_write();
    let letter = session.save_letter("Missing You", "Thinking of you.").await.unwrap();
    session.choose_read().await;
    letter
  }

  #[tokio::test]
  async fn test_save_returns_to_action_menu() {
    let mut session = session();
    session.choose_visitor(Participant::Boyfriend);
    session.choose_profile(Participant::Girlfriend).await;
    session.choose_write();
    let letter = session.save_letter("Missing You", "Thinking of you.").await.unwrap();

    assert_eq!(
      session.view(),
      &ViewState::SelectAction {
        visitor: Participant::Boyfriend,
        profile: Participant::Girlfriend
      }
    );
    assert_eq!(session.letters().len(), 1);
    assert_eq!(session.letters()[0].id, letter.id);
  }

  #[tokio::test]
  async fn test_failed_validation_stays_on_write() {
    let mut session = session();
    session.choose_visitor(Participant::Girlfriend);
    session.choose_profile(Participant::Boyfriend).await;
    session.choose_write();
    let err = session.save_letter("", "body").await.unwrap_err();
    assert!(matches!(err, DiaryError::Validation { .. }));
    assert!(matches!(session.view(), ViewState::Write { .. }));
  }

  #[tokio::test]
  async fn test_unlock_by_tapping() {
    let mut session = session();
    let letter = write_one(&mut session).await;

    assert!(session.open_letter(&letter.id));
    assert!(!session.tap());
    assert!(!session.drag_ribbon(50));
    assert!(session.drag_ribbon(150));
    for _ in 0..3 {
      session.tap();
    }
    assert!(matches!(session.view(), ViewState::Reveal { .. }));
    assert_eq!(
      session.outcome(),
      Some(UnlockOutcome {
        taps: 3,
        success: true
      })
    );
    assert_eq!(session.selected_letter().map(|l| l.title.as_str()), Some("Missing You"));
  }

  #[tokio::test]
  async fn test_unlock_by_timeout_then_play_again() {
    let mut session = session();
    let letter = write_one(&mut session).await;
    session.open_letter(&letter.id);
    session.drag_ribbon(101);
    session.tap();
    session.tick(Duration::from_secs(6));
    assert_eq!(session.outcome().map(|o| o.success), Some(false));

    session.play_again();
    assert!(matches!(session.view(), ViewState::RibbonPull { .. }));
    assert!(session.game().is_none());
    assert!(!session.ribbon().unwrap().is_pulled());
  }

  #[tokio::test]
  async fn test_delete_open_letter_closes_it() {
    let mut session = session();
    let letter = write_one(&mut session).await;
    session.open_letter(&letter.id);
    session.delete_letter(&letter.id).await.unwrap();
    assert!(matches!(session.view(), ViewState::Letters { .. }));
    assert!(session.letters().is_empty());
    assert!(session.ribbon().is_none());
  }

  #[tokio::test]
  async fn test_open_unknown_letter() {
    let mut session = session();
    write_one(&mut session).await;
    assert!(!session.open_letter("does-not-exist"));
  }

  #[tokio::test]
  async fn test_reset_forgets_letters() {
    let mut session = session();
    write_one(&mut session).await;
    session.reset();
    assert_eq!(session.view(), &ViewState::SelectVisitor);
    assert!(session.letters().is_empty());
  }
}
