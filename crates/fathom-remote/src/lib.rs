//! fathom-remote — remote-collaborator adapters for fathom.
//!
//! Each adapter implements one of the port traits from
//! [`fathom_core::remote`] against an in-memory backend: fixture-driven
//! schema lookup, a channel-backed fetch executor, a static index registry,
//! recording notification/redirect sinks, and an immediately-ready
//! visualization host. The demo binary and the integration harnesses wire
//! these into the orchestrator in place of a live cluster.

pub mod executor;
pub mod registry;
pub mod schema;
pub mod sinks;
pub mod timefilter;
pub mod vis;

pub use executor::InMemoryExecutor;
pub use registry::StaticIndexRegistry;
pub use schema::InMemorySchemaLookup;
pub use sinks::{InMemoryStateStore, Notification, NotifyLevel, RecordingNotifier, RecordingRedirect};
pub use timefilter::TimeFilter;
pub use vis::ImmediateVisHost;
