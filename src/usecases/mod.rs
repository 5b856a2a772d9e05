//! Use Cases Layer - Application Workflows
//!
//! Orchestrates domain rules with the repository port.
//!
//! Use cases:
//! - `DiarySession`: one visit, from choosing a visitor to reading a letter

pub mod diary_session;

pub use diary_session::DiarySession;
