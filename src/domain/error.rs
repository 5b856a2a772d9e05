//! Error taxonomy for storage providers and diary operations.
//!
//! `StorageError` describes what went wrong inside a provider and never
//! reaches the UI directly. `DiaryError` is what the letter repository
//! surfaces: validation and persistence failures are actionable by the
//! person at the keyboard, parse failures are only logged.

use thiserror::Error;

/// Failure inside a key-value provider.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure in a file- or directory-backed provider.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local store is full.
    #[error("quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded {
        /// Bytes the store would hold after the write.
        needed: usize,
        /// Configured limit.
        quota: usize,
    },

    /// Provider rejected or failed the call.
    #[error("{provider} provider failed: {message}")]
    Provider {
        /// Which provider failed.
        provider: &'static str,
        /// Description of the failure.
        message: String,
    },
}

impl StorageError {
    /// Create a provider failure.
    #[must_use]
    pub fn provider(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Provider {
            provider,
            message: message.into(),
        }
    }
}

/// Result alias for provider and adapter calls.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Failure surfaced by the letter repository.
#[derive(Debug, Error)]
pub enum DiaryError {
    /// Title or content is empty after trimming. Nothing was written.
    #[error("validation error: {message}")]
    Validation {
        /// Human-readable reason.
        message: String,
    },

    /// Write or delete did not succeed. Safe to retry.
    #[error("persistence error: {message}")]
    Persistence {
        /// Human-readable reason.
        message: String,
        /// Underlying provider failure, if any.
        #[source]
        source: Option<StorageError>,
    },

    /// Stored value is not a letter.
    #[error("parse error for {key}: {source}")]
    Parse {
        /// Storage key of the offending record.
        key: String,
        /// Deserialization failure.
        #[source]
        source: serde_json::Error,
    },
}

impl DiaryError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a persistence error without an underlying cause.
    #[must_use]
    pub fn unconfirmed(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a provider failure as a persistence error.
    #[must_use]
    pub fn persistence(message: impl Into<String>, source: StorageError) -> Self {
        Self::Persistence {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Whether retrying the same call can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }
}

/// Result alias for repository calls.
pub type DiaryResult<T> = std::result::Result<T, DiaryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_not_retryable() {
        let err = DiaryError::validation("title is empty");
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "validation error: title is empty");
    }

    #[test]
    fn test_persistence_keeps_source() {
        let err = DiaryError::persistence(
            "save failed",
            StorageError::QuotaExceeded {
                needed: 10,
                quota: 5,
            },
        );
        assert!(err.is_retryable());
        let source = std::error::Error::source(&err).map(|e| e.to_string());
        assert_eq!(
            source.as_deref(),
            Some("quota exceeded: 10 bytes needed, 5 allowed")
        );
    }

    #[test]
    fn test_provider_display() {
        let err = StorageError::provider("primary", "offline");
        assert_eq!(err.to_string(), "primary provider failed: offline");
    }
}
