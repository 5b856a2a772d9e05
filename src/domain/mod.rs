//! Domain layer - Letters, unlock rules and the view model.
//!
//! Pure types and rules for the couples diary. Nothing in here touches
//! storage or the terminal; ports and adapters build on these types.

pub mod error;
pub mod letter;
pub mod unlock;
pub mod view;

pub use error::{DiaryError, DiaryResult, StorageError, StorageResult};
pub use letter::{Letter, LetterDraft, Participant};
pub use unlock::{HeartGame, Ribbon, UnlockOutcome, UnlockRules};
pub use view::{ViewEvent, ViewState};
