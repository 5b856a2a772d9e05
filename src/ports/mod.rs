//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) the diary needs from the outside
//! world. Adapters implement these traits.
//!
//! Port categories:
//! - `KvProvider` / `LocalStore`: primary and secondary key-value providers
//! - `StorageAdapter`: uniform storage with provider fallback
//! - `LetterRepository`: letter persistence

pub mod kv_store;
pub mod repository;
