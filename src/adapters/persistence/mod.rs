//! Persistence Adapters - Letters in a Key-Value Store
//!
//! Implements the `LetterRepository` port on top of a `StorageAdapter`.
//! One JSON value per letter, keyed by recipient and id.

pub mod letter_repository;

pub use letter_repository::KvLetterRepository;
