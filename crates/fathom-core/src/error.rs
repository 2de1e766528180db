//! Error taxonomy for fathom.
//!
//! Nothing here is fatal to the process: every variant is surfaced as a user
//! notification at the orchestrator boundary and leaves the view in a
//! degraded but re-triable condition. The one exception is
//! [`ConfigurationError`], which ends initialization with a redirect instead
//! of a crash.

use thiserror::Error;

/// The view cannot be initialized with the available index patterns.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The requested index is unknown and no default index is configured.
    /// The orchestrator redirects to the index settings flow and never
    /// reaches the ready phase.
    #[error("no usable index pattern is configured")]
    NoUsableIndex,
}

/// The remote schema lookup for an index rejected.
///
/// The prior field catalog is retained so the view stays usable; the failure
/// is reported, not retried.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("schema lookup for index {index:?} failed: {reason}")]
pub struct SchemaLookupError {
    pub index: String,
    pub reason: String,
}

/// A remote query dispatch or result delivery failed.
///
/// The result stream stays armed after this is reported, so the next fetch
/// is still observed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("remote fetch failed: {0}")]
pub struct FetchError(pub String);

/// A row value could not be converted by a field's formatter.
///
/// Per-cell, never per-result: the orchestrator substitutes the raw value
/// and keeps the row.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot format value for field {field:?}")]
pub struct FormatError {
    pub field: String,
}
