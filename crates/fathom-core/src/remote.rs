//! Ports to the remote collaborators of one exploration view.
//!
//! Everything the orchestrator consumes from the outside world goes through
//! these traits: the schema lookup, the fetch executor, the index-pattern
//! registry, the persisted-state codec, and the notification/redirect sinks.
//! All capabilities are passed explicitly into the orchestrator's
//! constructor; there are no process-wide singletons.
//!
//! The async traits are `?Send`: the whole view runs on one cooperative
//! event loop and nothing here crosses threads.

use crate::error::{FetchError, SchemaLookupError};
use crate::field_catalog::FieldDescriptor;
use crate::types::{AuxVisualizationSpec, QueryDefinition, SearchState};
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Remote schema lookup for an index pattern.
#[async_trait(?Send)]
pub trait SchemaLookup {
    /// Fetch the raw field descriptors for `index`.
    ///
    /// `Ok(None)` means the index has no mapped fields yet — a soft no-op
    /// for the caller, not an error.
    async fn fields_for(&self, index: &str)
        -> Result<Option<Vec<FieldDescriptor>>, SchemaLookupError>;
}

/// Remote query executor.
///
/// Results and errors arrive on persistent streams owned by the caller; the
/// executor delivers indefinitely until its query handle is dropped.
#[async_trait(?Send)]
pub trait FetchExecutor {
    /// Dispatch a query. `generation` is echoed back on the matching result
    /// delivery so superseded responses can be recognized.
    async fn dispatch(&mut self, def: &QueryDefinition, generation: u64)
        -> Result<(), FetchError>;
}

/// Registry of configured index patterns.
pub trait IndexRegistry {
    fn known_index_ids(&self) -> BTreeSet<String>;
    fn default_index_id(&self) -> Option<String>;
}

/// User-facing notification sink. Fire-and-forget, no return contract.
pub trait Notifier {
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
    fn info(&self, msg: &str);
}

/// Navigation sink, used only on the no-usable-index failure path.
pub trait RedirectSink {
    fn redirect_to(&self, path: &str);
}

/// Write side of the persisted-state codec. The read side is the recovered
/// snapshot passed to [`AppState::new`](crate::app_state::AppState::new).
pub trait StateStore {
    fn save(&mut self, state: &SearchState);
}

/// Handle to a prepared auxiliary visualization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisHandle {
    pub spec: AuxVisualizationSpec,
}

/// Downstream renderer for the auxiliary histogram.
#[async_trait(?Send)]
pub trait VisualizationHost {
    /// Construct the visualization and resolve only once it signals
    /// readiness — an explicit two-phase handshake, not an immediate return.
    async fn prepare(&self, spec: &AuxVisualizationSpec) -> Result<VisHandle, FetchError>;
}
