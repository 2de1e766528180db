//! Core types for fathom-core.
//!
//! This module defines the data structures shared across all layers: the
//! persisted [`SearchState`], the per-cycle [`QueryDefinition`], and the
//! fetch result shapes ([`FetchResponse`], [`HitRow`]).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the synthetic raw-document field injected into every catalog and
/// used as the column fallback when nothing else is displayed.
pub const SOURCE_FIELD: &str = "_source";

/// The browser-addressable search state for one exploration view.
///
/// `columns` is an ordered, duplicate-free sequence and is never empty: any
/// mutation that would empty it resets it to `["_source"]` at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchState {
    /// Free-text query string, empty when no filter is applied.
    pub query: String,
    /// Ordered list of displayed column names.
    pub columns: Vec<String>,
    /// Active sort, as a single field/direction pair.
    pub sort: SortSpec,
    /// Id of the index pattern being explored.
    pub index: String,
}

/// A single `[field, direction]` sort pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self { field: field.into(), direction }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// Top-level keys of [`SearchState`], used in changed-key notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StateKey {
    Query,
    Columns,
    Sort,
    Index,
}

/// The remote-executable query shape, rebuilt on every fetch cycle and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDefinition {
    /// Index the query is currently bound to.
    pub index: String,
    /// Number of rows to request.
    pub size: usize,
    pub sort: SortSpec,
    /// Free-text filter; `None` when the query string is empty.
    pub filter: Option<String>,
}

/// A raw result row as returned by the remote executor. Keys are field names.
pub type RawRow = BTreeMap<String, serde_json::Value>;

/// One delivery on the executor's result stream.
///
/// `generation` echoes the fetch generation passed to
/// [`FetchExecutor::dispatch`](crate::remote::FetchExecutor::dispatch); the
/// orchestrator drops deliveries from superseded generations.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    pub generation: u64,
    pub total_hits: u64,
    pub rows: Vec<RawRow>,
}

/// A result row after per-field formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct HitRow {
    /// The raw source object.
    pub source: RawRow,
    /// Display string per field name, plus a `_source` entry holding the
    /// compact JSON of the whole source object, truncated to the configured
    /// summary length.
    pub formatted: BTreeMap<String, String>,
}

/// An absolute time window, compared by deep equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub from: chrono::DateTime<chrono::Utc>,
    pub to: chrono::DateTime<chrono::Utc>,
}

/// Derived configuration for the auxiliary histogram visualization.
///
/// Present iff the field catalog contains a date-typed field: a count metric
/// segmented by a date histogram over `time_field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxVisualizationSpec {
    pub time_field: String,
    pub min_doc_count: u64,
}
