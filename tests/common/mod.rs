//! Shared test utilities for fathom integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. The central piece is [`Rig`]: an orchestrator wired to
//! in-memory collaborators, with shared handles to every recorded
//! interaction (dispatches, schema lookups, notifications, redirects,
//! persisted snapshots).

// not every harness uses every builder
#![allow(dead_code)]

pub mod builders;

pub use builders::*;
