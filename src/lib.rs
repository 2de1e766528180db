//! fathom — reactive search-state engine for interactive data exploration.
//!
//! Given a stateful search definition (index, free-text query, sort,
//! displayed columns), fathom keeps an observable state object, a derived
//! field catalog, and a remote query executor consistent with each other,
//! re-issuing queries exactly when semantically relevant state changes.
//!
//! # Architecture
//!
//! ```text
//! AppState ──changed keys──► SearchOrchestrator ──QueryDefinition──► executor
//!     ▲                            │      ▲                             │
//!     └──columns reconcile── FieldCatalog └────────result stream────────┘
//! ```
//!
//! The domain layers live in `fathom_core`; the in-memory remote adapters
//! used by the demo binary and the harnesses live in `fathom_remote`. This
//! crate contributes the [`SearchOrchestrator`] controller that composes
//! them on a single cooperative event loop.

pub mod orchestrator;

pub use orchestrator::{Collaborators, Phase, SearchOrchestrator};
