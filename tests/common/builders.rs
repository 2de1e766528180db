//! Test builders — ergonomic constructors for orchestrator rigs, field
//! fixtures, and fetch responses.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning
//! `Result`.

use fathom::{Collaborators, SearchOrchestrator};
use fathom_core::app_state::StateOverlay;
use fathom_core::config::Config;
use fathom_core::error::FetchError;
use fathom_core::field_catalog::{FieldDescriptor, FieldType};
use fathom_core::types::{
    FetchResponse, QueryDefinition, RawRow, SearchState, SortDirection, SortSpec, TimeRange,
    SOURCE_FIELD,
};
use fathom_remote::{
    ImmediateVisHost, InMemoryExecutor, InMemorySchemaLookup, InMemoryStateStore, Notification,
    NotifyLevel, RecordingNotifier, RecordingRedirect, StaticIndexRegistry, TimeFilter,
};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Field fixtures
// ---------------------------------------------------------------------------

/// Fields of the "logs" fixture index. Contains a date field, so the
/// auxiliary visualization is eligible.
pub fn log_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("timestamp", FieldType::Date),
        FieldDescriptor::new("host", FieldType::String),
        FieldDescriptor::new("bytes", FieldType::Number),
        FieldDescriptor::new("message", FieldType::String),
    ]
}

/// Fields of the "metrics" fixture index.
pub fn metric_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("timestamp", FieldType::Date),
        FieldDescriptor::new("host", FieldType::String),
        FieldDescriptor::new("cpu_pct", FieldType::Number),
    ]
}

/// Fields of the "plain" fixture index: no date field, no visualization.
pub fn plain_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("name", FieldType::String),
        FieldDescriptor::new("value", FieldType::Number),
    ]
}

/// The stock state defaults used by the exploration view.
pub fn default_state(index: &str) -> SearchState {
    SearchState {
        query: String::new(),
        columns: vec![SOURCE_FIELD.to_string()],
        sort: SortSpec::new("_score", SortDirection::Desc),
        index: index.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Response builders
// ---------------------------------------------------------------------------

/// Build a raw row from `(field, value)` pairs.
pub fn row(pairs: &[(&str, serde_json::Value)]) -> RawRow {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

/// Build a result delivery for a given fetch generation.
pub fn response(generation: u64, rows: Vec<RawRow>) -> FetchResponse {
    FetchResponse {
        generation,
        total_hits: rows.len() as u64,
        rows,
    }
}

/// A deterministic time window, offset in whole minutes from a fixed epoch.
pub fn time_range(from_min: i64, to_min: i64) -> TimeRange {
    let epoch = chrono::DateTime::from_timestamp(1_700_000_000, 0)
        .expect("fixed epoch must be valid");
    TimeRange {
        from: epoch + chrono::Duration::minutes(from_min),
        to: epoch + chrono::Duration::minutes(to_min),
    }
}

// ---------------------------------------------------------------------------
// Rig
// ---------------------------------------------------------------------------

/// An orchestrator wired to in-memory collaborators, plus shared handles to
/// everything those collaborators record.
pub struct Rig {
    pub view: SearchOrchestrator,
    pub dispatches: Rc<RefCell<Vec<(QueryDefinition, u64)>>>,
    pub lookups: Rc<RefCell<Vec<String>>>,
    pub failing: Rc<RefCell<BTreeSet<String>>>,
    pub notifications: Rc<RefCell<Vec<Notification>>>,
    pub redirect: Rc<RefCell<Option<String>>>,
    pub snapshots: Rc<RefCell<Vec<SearchState>>>,
    pub results: mpsc::UnboundedSender<FetchResponse>,
    pub errors: mpsc::UnboundedSender<FetchError>,
    pub time: TimeFilter,
}

impl Rig {
    pub fn builder() -> RigBuilder {
        RigBuilder::new()
    }

    /// Rig with the stock fixtures and defaults, already past `initialize`.
    pub async fn ready() -> Self {
        let mut rig = Rig::builder().build();
        rig.view.initialize().await.expect("initialize must succeed");
        rig
    }

    pub fn dispatch_count(&self) -> usize {
        self.dispatches.borrow().len()
    }

    pub fn last_dispatch(&self) -> (QueryDefinition, u64) {
        self.dispatches
            .borrow()
            .last()
            .cloned()
            .expect("no query was dispatched")
    }

    pub fn messages_at(&self, level: NotifyLevel) -> Vec<String> {
        self.notifications
            .borrow()
            .iter()
            .filter(|n| n.level == level)
            .map(|n| n.message.clone())
            .collect()
    }
}

/// Builder over the fixture schema (logs/metrics/plain), registry, and state
/// defaults.
pub struct RigBuilder {
    defaults: SearchState,
    recovered: Option<StateOverlay>,
    known: Vec<String>,
    default_index: Option<String>,
    failing: Vec<String>,
}

impl RigBuilder {
    pub fn new() -> Self {
        Self {
            defaults: default_state("logs"),
            recovered: None,
            known: vec!["logs".into(), "metrics".into(), "plain".into()],
            default_index: Some("logs".into()),
            failing: Vec::new(),
        }
    }

    pub fn defaults(mut self, defaults: SearchState) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn recovered(mut self, overlay: StateOverlay) -> Self {
        self.recovered = Some(overlay);
        self
    }

    pub fn no_default_index(mut self) -> Self {
        self.default_index = None;
        self
    }

    pub fn failing_index(mut self, id: impl Into<String>) -> Self {
        self.failing.push(id.into());
        self
    }

    pub fn build(self) -> Rig {
        let mut schema = InMemorySchemaLookup::new()
            .with_index("logs", log_fields())
            .with_index("metrics", metric_fields())
            .with_index("plain", plain_fields());
        for id in self.failing {
            schema = schema.with_failing_index(id);
        }
        let lookups = schema.lookup_log();
        let failing = schema.failing_handle();

        let (executor, results_rx, errors_rx) = InMemoryExecutor::new();
        let dispatches = executor.dispatch_log();
        let results = executor.result_sender();
        let errors = executor.error_sender();

        let mut registry = StaticIndexRegistry::new(self.known);
        if let Some(default) = self.default_index {
            registry = registry.with_default(default);
        }

        let notifier = RecordingNotifier::new();
        let notifications = notifier.log();
        let redirect_sink = RecordingRedirect::new();
        let redirect = redirect_sink.target();
        let store = InMemoryStateStore::new();
        let snapshots = store.snapshots();

        let (time, time_changes) = TimeFilter::channel();

        let view = SearchOrchestrator::new(
            Config::defaults(),
            self.defaults,
            self.recovered,
            Some(Box::new(store)),
            Collaborators {
                schema: Box::new(schema),
                executor: Box::new(executor),
                results: results_rx,
                errors: errors_rx,
                registry: Box::new(registry),
                notifier: Box::new(notifier),
                redirect: Box::new(redirect_sink),
                vis_host: Box::new(ImmediateVisHost::new()),
                time_changes,
            },
        );

        Rig {
            view,
            dispatches,
            lookups,
            failing,
            notifications,
            redirect,
            snapshots,
            results,
            errors,
            time,
        }
    }
}

impl Default for RigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
