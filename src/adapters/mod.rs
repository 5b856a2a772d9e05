//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! storage. Each sub-module groups adapters by concern.
//!
//! Adapter categories:
//! - `storage`: key-value providers and the fallback strategy
//! - `persistence`: letter repository over a storage adapter

pub mod persistence;
pub mod storage;
