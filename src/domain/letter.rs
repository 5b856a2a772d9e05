//! Letter domain types.
//!
//! A letter is written once by one participant into the other's (or their
//! own) diary and never edited. Its storage key is derived from the
//! recipient and the id so that one recipient's diary can be listed by
//! key prefix alone.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::error::{DiaryError, DiaryResult};

/// Namespace shared by every letter key.
pub const LETTER_NAMESPACE: &str = "letters";

/// Last issued id, in Unix milliseconds.
static LAST_ID_MS: AtomicI64 = AtomicI64::new(0);

/// One of the two diary owners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Participant {
    Boyfriend,
    Girlfriend,
}

impl Participant {
    /// Both participants, in menu order.
    pub const ALL: [Self; 2] = [Self::Boyfriend, Self::Girlfriend];

    /// Tag used in storage keys and JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boyfriend => "boyfriend",
            Self::Girlfriend => "girlfriend",
        }
    }

    /// The other participant.
    #[must_use]
    pub const fn partner(self) -> Self {
        match self {
            Self::Boyfriend => Self::Girlfriend,
            Self::Girlfriend => Self::Boyfriend,
        }
    }
}

impl std::fmt::Display for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boyfriend => write!(f, "Boyfriend"),
            Self::Girlfriend => write!(f, "Girlfriend"),
        }
    }
}

/// Input that names neither participant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown participant: {0:?} (expected boyfriend or girlfriend)")]
pub struct UnknownParticipant(pub String);

impl std::str::FromStr for Participant {
    type Err = UnknownParticipant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "boyfriend" => Ok(Self::Boyfriend),
            "girlfriend" => Ok(Self::Girlfriend),
            _ => Err(UnknownParticipant(s.to_string())),
        }
    }
}

/// Title and content that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterDraft {
    title: String,
    content: String,
}

impl LetterDraft {
    /// Trim both fields and reject either being empty.
    pub fn new(title: &str, content: &str) -> DiaryResult<Self> {
        let title = title.trim();
        let content = content.trim();
        if title.is_empty() || content.is_empty() {
            return Err(DiaryError::validation(
                "Please fill in both title and message",
            ));
        }
        Ok(Self {
            title: title.to_string(),
            content: content.to_string(),
        })
    }

    /// Trimmed title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Trimmed content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// A stored letter.
///
/// Serializes to exactly `id`, `title`, `content`, `from`, `to`, `date`
/// and `read`. `date` is ISO-8601 with millisecond precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Letter {
    /// Creation-time-derived unique id.
    pub id: String,
    pub title: String,
    pub content: String,
    /// Author.
    pub from: Participant,
    /// Diary owner the letter is filed under.
    pub to: Participant,
    /// Creation timestamp; the only sort key.
    #[serde(with = "iso_millis")]
    pub date: DateTime<Utc>,
    /// Never transitioned; kept for format compatibility.
    pub read: bool,
}

impl Letter {
    /// Build a new unread letter stamped at `now`.
    #[must_use]
    pub fn compose(
        draft: LetterDraft,
        from: Participant,
        to: Participant,
        now: DateTime<Utc>,
    ) -> Self {
        let date = truncate_to_millis(now);
        Self {
            id: next_letter_id(date),
            title: draft.title,
            content: draft.content,
            from,
            to,
            date,
            read: false,
        }
    }

    /// Storage key this letter lives under.
    #[must_use]
    pub fn storage_key(&self) -> String {
        letter_key(self.to, &self.id)
    }

    /// Serialize to the stored JSON form.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse a stored value read from `key`.
    pub fn from_json(key: &str, value: &str) -> DiaryResult<Self> {
        serde_json::from_str(value).map_err(|source| DiaryError::Parse {
            key: key.to_string(),
            source,
        })
    }
}

/// Key prefix of one recipient's diary, e.g. `letters:girlfriend:`.
#[must_use]
pub fn recipient_prefix(recipient: Participant) -> String {
    format!("{LETTER_NAMESPACE}:{}:", recipient.as_str())
}

/// Composite storage key `letters:{recipient}:{id}`.
#[must_use]
pub fn letter_key(recipient: Participant, id: &str) -> String {
    format!("{}{id}", recipient_prefix(recipient))
}

/// Sort newest first. Stable, so equal dates keep their listing order.
pub fn sort_newest_first(letters: &mut [Letter]) {
    letters.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Issue an id from the creation time in Unix milliseconds.
///
/// Two letters created within the same millisecond get consecutive values,
/// so ids never repeat within one process.
fn next_letter_id(now: DateTime<Utc>) -> String {
    let now_ms = now.timestamp_millis();
    let previous = LAST_ID_MS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now_ms.max(last + 1))
        })
        .unwrap_or(now_ms);
    now_ms.max(previous + 1).to_string()
}

fn truncate_to_millis(now: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

mod iso_millis {
    use super::{DateTime, Deserialize, Deserializer, SecondsFormat, Serializer, Utc};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|date| date.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(title: &str, date: &str) -> Letter {
        Letter {
            id: "1700000000000".to_string(),
            title: title.to_string(),
            content: "body".to_string(),
            from: Participant::Boyfriend,
            to: Participant::Girlfriend,
            date: DateTime::parse_from_rfc3339(date).unwrap().with_timezone(&Utc),
            read: false,
        }
    }

    #[test]
    fn test_draft_trims() {
        let draft = LetterDraft::new("  Missing You ", "\nThinking of you.\t").unwrap();
        assert_eq!(draft.title(), "Missing You");
        assert_eq!(draft.content(), "Thinking of you.");
    }

    #[test]
    fn test_draft_rejects_blank() {
        assert!(matches!(
            LetterDraft::new("   ", "content"),
            Err(DiaryError::Validation { .. })
        ));
        assert!(matches!(
            LetterDraft::new("title", " \n "),
            Err(DiaryError::Validation { .. })
        ));
    }

    #[test]
    fn test_keys() {
        assert_eq!(recipient_prefix(Participant::Girlfriend), "letters:girlfriend:");
        assert_eq!(
            letter_key(Participant::Boyfriend, "42"),
            "letters:boyfriend:42"
        );
        let letter = sample("t", "2024-02-14T10:00:00.000Z");
        assert_eq!(letter.storage_key(), "letters:girlfriend:1700000000000");
    }

    #[test]
    fn test_json_shape() {
        let letter = sample("Hello", "2024-02-14T10:00:00.123Z");
        let value: serde_json::Value = serde_json::from_str(&letter.to_json().unwrap()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 7);
        assert_eq!(object["from"], "boyfriend");
        assert_eq!(object["to"], "girlfriend");
        assert_eq!(object["date"], "2024-02-14T10:00:00.123Z");
        assert_eq!(object["read"], false);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = Letter::from_json("letters:girlfriend:1", "{not json").unwrap_err();
        assert!(matches!(err, DiaryError::Parse { ref key, .. } if key == "letters:girlfriend:1"));
        assert!(Letter::from_json("k", r#"{"id":"1","title":"x"}"#).is_err());
    }

    #[test]
    fn test_accepts_offset_dates() {
        let json = r#"{"id":"1","title":"t","content":"c","from":"girlfriend","to":"boyfriend","date":"2024-02-14T12:00:00+02:00","read":false}"#;
        let letter = Letter::from_json("k", json).unwrap();
        assert_eq!(letter.date.to_rfc3339_opts(SecondsFormat::Millis, true), "2024-02-14T10:00:00.000Z");
    }

    #[test]
    fn test_ids_distinct_within_same_millisecond() {
        let now = Utc::now();
        let a = Letter::compose(LetterDraft::new("a", "a").unwrap(), Participant::Boyfriend, Participant::Girlfriend, now);
        let b = Letter::compose(LetterDraft::new("b", "b").unwrap(), Participant::Boyfriend, Participant::Girlfriend, now);
        assert_ne!(a.id, b.id);
        assert!(b.id.parse::<i64>().unwrap() > a.id.parse::<i64>().unwrap());
        assert!(!a.read);
    }

    #[test]
    fn test_sort_newest_first_is_stable() {
        let mut letters = vec![
            sample("old", "2024-01-01T00:00:00.000Z"),
            sample("tie-1", "2024-03-01T00:00:00.000Z"),
            sample("new", "2024-05-01T00:00:00.000Z"),
            sample("tie-2", "2024-03-01T00:00:00.000Z"),
        ];
        sort_newest_first(&mut letters);
        let titles: Vec<_> = letters.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, ["new", "tie-1", "tie-2", "old"]);
    }

    #[test]
    fn test_participant_parse() {
        assert_eq!("Girlfriend".parse::<Participant>().unwrap(), Participant::Girlfriend);
        assert_eq!(" boyfriend ".parse::<Participant>().unwrap(), Participant::Boyfriend);
        assert!("friend".parse::<Participant>().is_err());
        assert_eq!(Participant::Boyfriend.partner(), Participant::Girlfriend);
    }
}
