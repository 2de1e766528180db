//! fathom-core — domain layer of the fathom exploration engine.
//!
//! This crate exposes the pure state-and-derivation layers as public
//! modules, plus the shared types used across all of them.
//!
//! # Architecture
//!
//! ```text
//! AppState ──► SearchOrchestrator ◄── FieldCatalog
//!                    │                     │
//!              QueryDefinition        ColumnSet
//! ```
//!
//! Nothing in this crate performs I/O. The remote collaborators are reached
//! through the port traits in [`remote`]; the orchestrator that composes
//! everything lives in the root `fathom` crate.

pub mod app_state;
pub mod column_set;
pub mod config;
pub mod error;
pub mod field_catalog;
pub mod query_string;
pub mod remote;
pub mod types;

pub use app_state::{AppState, StateOverlay};
pub use field_catalog::{Field, FieldCatalog, FieldDescriptor, FieldType, Formatter};
pub use types::{
    AuxVisualizationSpec, FetchResponse, HitRow, QueryDefinition, RawRow, SearchState,
    SortDirection, SortSpec, StateKey, TimeRange, SOURCE_FIELD,
};
