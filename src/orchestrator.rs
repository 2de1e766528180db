//! Search orchestrator — the controller that keeps the app state, the field
//! catalog, and the remote query definition consistent with each other.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──initialize()──► Initializing ──► Ready
//!                                      │ (no usable index: redirect, stop)
//!     Ready ──fetch()──► Fetching ──success──► Ready
//!                             └────failure────► Ready (error notified)
//! ```
//!
//! State commits and time-range changes arrive on internal channels and are
//! gated in [`SearchOrchestrator::process_pending`]: a columns-only commit
//! never re-issues a query, a sort commit only fetches when it actually
//! differs from the sort bound into the live query definition, and a time
//! change only fetches when a previous value existed and the new one differs.
//!
//! Every fetch carries a monotonic generation; result deliveries from a
//! superseded generation are dropped instead of overwriting newer rows.

use fathom_core::app_state::{AppState, StateOverlay};
use fathom_core::column_set::{self, Reconciled};
use fathom_core::config::Config;
use fathom_core::error::{ConfigurationError, FetchError};
use fathom_core::field_catalog::FieldCatalog;
use fathom_core::query_string::{self, ClausePolarity};
use fathom_core::remote::{
    FetchExecutor, IndexRegistry, Notifier, RedirectSink, SchemaLookup, StateStore, VisHandle,
    VisualizationHost,
};
use fathom_core::types::{
    AuxVisualizationSpec, FetchResponse, HitRow, QueryDefinition, SearchState, StateKey,
    TimeRange, SOURCE_FIELD,
};
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::mpsc;

/// Path of the index-configuration flow, used when no default index exists.
const INDEX_SETTINGS_PATH: &str = "/settings/indices";

/// Orchestrator lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Initializing,
    Ready,
    Fetching,
}

/// The remote collaborators of one exploration view, passed explicitly into
/// the constructor. No ambient singletons.
pub struct Collaborators {
    pub schema: Box<dyn SchemaLookup>,
    pub executor: Box<dyn FetchExecutor>,
    /// Persistent result stream of the executor's query handle.
    pub results: mpsc::UnboundedReceiver<FetchResponse>,
    /// Persistent error stream of the executor's query handle.
    pub errors: mpsc::UnboundedReceiver<FetchError>,
    pub registry: Box<dyn IndexRegistry>,
    pub notifier: Box<dyn Notifier>,
    pub redirect: Box<dyn RedirectSink>,
    pub vis_host: Box<dyn VisualizationHost>,
    /// Time-range change notifications from the owning view's time filter.
    pub time_changes: mpsc::UnboundedReceiver<TimeRange>,
}

/// Controller for one exploration view. Single-owner: state, catalog, and
/// query definition belong to this instance alone.
pub struct SearchOrchestrator {
    config: Config,
    defaults: SearchState,
    state: AppState,
    phase: Phase,

    /// Index the user wants active; the next fetch cycle rebinds to it.
    active_index: String,
    catalog: Option<FieldCatalog>,
    query_def: QueryDefinition,
    /// Name of the first date field of the catalog, when one exists.
    time_field: Option<String>,
    time_filter_enabled: bool,
    last_time: Option<TimeRange>,
    vis: Option<VisHandle>,

    total_hits: u64,
    rows: Vec<HitRow>,
    /// Monotonic fetch generation; stale result deliveries are dropped.
    generation: u64,

    state_events_tx: mpsc::UnboundedSender<BTreeSet<StateKey>>,
    state_events: mpsc::UnboundedReceiver<BTreeSet<StateKey>>,

    schema: Box<dyn SchemaLookup>,
    executor: Box<dyn FetchExecutor>,
    results: mpsc::UnboundedReceiver<FetchResponse>,
    errors: mpsc::UnboundedReceiver<FetchError>,
    registry: Box<dyn IndexRegistry>,
    notifier: Box<dyn Notifier>,
    redirect: Box<dyn RedirectSink>,
    vis_host: Box<dyn VisualizationHost>,
    time_changes: mpsc::UnboundedReceiver<TimeRange>,
}

impl SearchOrchestrator {
    /// Build an orchestrator from defaults, an optional recovered state
    /// snapshot, an optional persisted-state store, and the remote
    /// collaborators.
    pub fn new(
        config: Config,
        defaults: SearchState,
        recovered: Option<StateOverlay>,
        store: Option<Box<dyn StateStore>>,
        collaborators: Collaborators,
    ) -> Self {
        let mut state = AppState::new(defaults.clone(), recovered);
        if let Some(store) = store {
            state = state.with_store(store);
        }
        let (state_events_tx, state_events) = mpsc::unbounded_channel();

        let query_def = QueryDefinition {
            index: state.index().to_string(),
            size: config.search.sample_size,
            sort: state.sort().clone(),
            filter: None,
        };
        let active_index = state.index().to_string();

        SearchOrchestrator {
            config,
            defaults,
            state,
            phase: Phase::Uninitialized,
            active_index,
            catalog: None,
            query_def,
            time_field: None,
            time_filter_enabled: false,
            last_time: None,
            vis: None,
            total_hits: 0,
            rows: Vec::new(),
            generation: 0,
            state_events_tx,
            state_events,
            schema: collaborators.schema,
            executor: collaborators.executor,
            results: collaborators.results,
            errors: collaborators.errors,
            registry: collaborators.registry,
            notifier: collaborators.notifier,
            redirect: collaborators.redirect,
            vis_host: collaborators.vis_host,
            time_changes: collaborators.time_changes,
        }
    }

    /// One-shot initialization: validate the index, load the field catalog,
    /// derive the initial query definition, subscribe to state changes, and
    /// resolve the auxiliary visualization.
    ///
    /// With an unknown index and no default configured, the user is
    /// redirected to the index settings flow and the orchestrator never
    /// reaches [`Phase::Ready`].
    pub async fn initialize(&mut self) -> Result<(), ConfigurationError> {
        if self.phase != Phase::Uninitialized {
            return Ok(());
        }
        self.phase = Phase::Initializing;

        let known = self.registry.known_index_ids();
        if !known.contains(self.state.index()) {
            let reason = format!(
                "The index {:?} is not a configured pattern. ",
                self.state.index()
            );
            match self.registry.default_index_id() {
                Some(default) => {
                    self.notifier.warn(&format!(
                        "{reason}Updated it to use the default: {default:?}"
                    ));
                    self.state.set_index(default.clone());
                    self.active_index = default;
                    self.query_def.index = self.active_index.clone();
                }
                None => {
                    self.notifier
                        .warn(&format!("{reason}Please set a default index to continue."));
                    self.redirect.redirect_to(INDEX_SETTINGS_PATH);
                    return Err(ConfigurationError::NoUsableIndex);
                }
            }
        }

        self.refresh_fields().await;
        self.rebuild_query_shape();

        let tx = self.state_events_tx.clone();
        self.state.on_update(move |changed| {
            let _ = tx.send(changed.clone());
        });

        if let Err(err) = self.resolve_visualization().await {
            self.notifier.error(&err.to_string());
        }

        self.phase = Phase::Ready;
        tracing::debug!(index = %self.active_index, "orchestrator ready");
        Ok(())
    }

    /// Drain pending state-commit and time-range notifications and run a
    /// single fetch if any of them warrants one.
    pub async fn process_pending(&mut self) {
        let mut fetch_needed = false;

        while let Ok(changed) = self.state_events.try_recv() {
            if self.needs_fetch(&changed) {
                fetch_needed = true;
            }
        }

        while let Ok(range) = self.time_changes.try_recv() {
            // no fetch on the first delivered value, only on a real change
            let previous = self.last_time.replace(range);
            if matches!(previous, Some(old) if old != range) {
                fetch_needed = true;
            }
        }

        if fetch_needed {
            self.fetch().await;
        }
    }

    /// One fetch cycle: rebuild the query definition, re-resolve the
    /// visualization, enable the time filter if a time field is bound,
    /// commit pending state, and dispatch. Failures are notified, never
    /// fatal.
    pub async fn fetch(&mut self) {
        self.phase = Phase::Fetching;

        self.update_query_definition().await;

        if let Err(err) = self.resolve_visualization().await {
            self.notifier.error(&err.to_string());
        }
        if self.time_field.is_some() {
            self.time_filter_enabled = true;
        }

        // commits made by this cycle are subsumed by the dispatch below;
        // drop their notifications so they cannot trigger a second fetch
        self.state.commit();
        while self.state_events.try_recv().is_ok() {}

        self.generation += 1;
        tracing::debug!(
            index = %self.query_def.index,
            generation = self.generation,
            filter = ?self.query_def.filter,
            "fetch"
        );
        if let Err(err) = self.executor.dispatch(&self.query_def, self.generation).await {
            tracing::error!(error = %err, "dispatch failed");
            self.notifier.error(&err.to_string());
        }
        self.phase = Phase::Ready;
    }

    /// Wait for the next non-stale result delivery and apply it.
    ///
    /// Errors on the error stream are logged and notified, then observation
    /// continues — an error never disarms the subscription. Returns `false`
    /// only when both streams have closed.
    pub async fn await_result(&mut self) -> bool {
        loop {
            tokio::select! {
                // errors are drained before results so a failure is always
                // notified before the success that follows it
                biased;
                error = self.errors.recv() => match error {
                    Some(err) => {
                        tracing::error!(error = %err, "fetch error delivered");
                        self.notifier.error(
                            "An error occurred with your request. Reset your inputs and try again.",
                        );
                        // keep observing: the stream stays armed
                    }
                    None => return false,
                },
                response = self.results.recv() => match response {
                    Some(response) if response.generation < self.generation => {
                        tracing::debug!(
                            stale = response.generation,
                            current = self.generation,
                            "stale result dropped"
                        );
                    }
                    Some(response) => {
                        self.apply_response(response);
                        return true;
                    }
                    None => return false,
                },
            }
        }
    }

    /// Toggle a field's display flag and reconcile the column list. Local to
    /// the view: the resulting columns-only commit never re-issues a query.
    ///
    /// Without a loaded catalog (schema lookup failed or still pending) the
    /// toggle is refused with a warning; the view stays usable.
    pub fn toggle_field(&mut self, name: &str) {
        let Some(catalog) = self.catalog.as_mut() else {
            tracing::warn!(field = name, "field toggled without a loaded catalog");
            self.notifier
                .warn("Fields are not available yet. Retry once the index schema has loaded.");
            return;
        };
        let columns = column_set::toggle_field(catalog, self.state.columns(), name);
        self.state.set_columns(columns);
        self.refresh_columns();
    }

    /// Apply a clause toggle to the query text and fetch.
    pub async fn filter_query(&mut self, field: &str, values: &[&str], polarity: ClausePolarity) {
        let query = query_string::toggle_clause(self.state.query(), field, values, polarity);
        self.state.set_query(query);
        self.fetch().await;
    }

    /// Restore query, sort, and columns to the constructor defaults and fetch.
    pub async fn reset_query(&mut self) {
        self.state.set_query(self.defaults.query.clone());
        self.state.set_sort(self.defaults.sort.clone());
        self.state.set_columns(self.defaults.columns.clone());
        self.fetch().await;
    }

    /// Record the index the user picked; the next fetch cycle rebinds to it.
    pub fn set_active_index(&mut self, index: impl Into<String>) {
        self.active_index = index.into();
    }

    /// Switch to another index and run the fetch cycle that rebinds to it.
    pub async fn switch_index(&mut self, index: impl Into<String>) {
        self.set_active_index(index);
        self.fetch().await;
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// A commit warrants a fetch unless only columns changed; a sort change
    /// only counts when it differs from the sort bound into the live query
    /// definition.
    fn needs_fetch(&self, changed: &BTreeSet<StateKey>) -> bool {
        changed.iter().any(|key| match key {
            StateKey::Columns => false,
            StateKey::Sort => *self.state.sort() != self.query_def.sort,
            StateKey::Query | StateKey::Index => true,
        })
    }

    /// Rebuild size/sort/filter from current state.
    fn rebuild_query_shape(&mut self) {
        self.query_def.size = self.config.search.sample_size;
        self.query_def.sort = self.state.sort().clone();
        self.query_def.filter = if self.state.query().is_empty() {
            None
        } else {
            Some(self.state.query().to_string())
        };
    }

    /// Rebuild the query definition; when the active index differs from the
    /// bound one, rebind it, discard the field catalog (the only path that
    /// does), and reload the schema.
    async fn update_query_definition(&mut self) {
        self.rebuild_query_shape();

        if self.active_index != self.query_def.index {
            tracing::debug!(from = %self.query_def.index, to = %self.active_index, "index switch");
            self.query_def.index = self.active_index.clone();
            self.state.set_index(self.active_index.clone());
            self.catalog = None;
            self.time_field = None;
            self.vis = None;
            self.refresh_fields().await;
        }
    }

    /// Reload the field catalog for the active index.
    ///
    /// A lookup yielding no descriptors leaves the catalog untouched; a
    /// rejected lookup is notified and the prior catalog retained.
    async fn refresh_fields(&mut self) {
        match self.schema.fields_for(&self.active_index).await {
            Ok(Some(raw)) => {
                let prior = self.catalog.take();
                let catalog = FieldCatalog::build(raw, prior.as_ref(), self.state.columns());
                self.time_field = catalog.first_date_field().map(|f| f.name.clone());
                self.catalog = Some(catalog);
                self.refresh_columns();
            }
            Ok(None) => {
                tracing::debug!(index = %self.active_index, "index has no mapped fields yet");
            }
            Err(err) => {
                tracing::warn!(error = %err, "schema lookup rejected");
                self.notifier.error(&err.to_string());
            }
        }
    }

    /// Reconcile the column list against the catalog's display flags; an
    /// emptied list falls back to `_source`, forced on rather than toggled so
    /// the fallback can never oscillate.
    fn refresh_columns(&mut self) {
        let Some(catalog) = &self.catalog else { return };
        let displayed = catalog.displayed_names();

        match column_set::reconcile(&displayed, self.state.columns()) {
            Reconciled::Columns(columns) => {
                self.state.set_columns(columns);
                // a commit that changes more than the columns will be picked
                // up by process_pending and executed as a fetch
                self.state.commit();
            }
            Reconciled::NeedsSourceFallback => {
                if let Some(catalog) = self.catalog.as_mut() {
                    if let Some(source) = catalog.get_mut(SOURCE_FIELD) {
                        source.display = true;
                    }
                }
                self.state.set_columns(vec![SOURCE_FIELD.to_string()]);
                self.state.commit();
            }
        }
    }

    /// Drop or create the auxiliary visualization to match the current time
    /// field. Creation resolves only after the renderer signals readiness.
    async fn resolve_visualization(&mut self) -> Result<(), FetchError> {
        let Some(time_field) = self.time_field.clone() else {
            if self.vis.take().is_some() {
                tracing::debug!("auxiliary visualization discarded");
            }
            return Ok(());
        };
        if self.vis.is_some() {
            return Ok(());
        }

        let spec = AuxVisualizationSpec {
            time_field,
            min_doc_count: self.config.search.min_doc_count,
        };
        self.vis = Some(self.vis_host.prepare(&spec).await?);
        Ok(())
    }

    /// Overwrite hits/rows with a delivered result and compute the formatted
    /// values per row. A formatting failure substitutes the raw JSON value
    /// for that cell and keeps the row.
    fn apply_response(&mut self, response: FetchResponse) {
        let catalog = self.catalog.as_ref();
        let max_summary = self.config.search.max_summary_length;

        let rows: Vec<HitRow> = response
            .rows
            .into_iter()
            .map(|source| {
                let mut formatted = BTreeMap::new();
                for (name, value) in &source {
                    let display = match catalog.and_then(|c| c.get(name)) {
                        Some(field) => field.format.convert(name, value).unwrap_or_else(|err| {
                            tracing::warn!(error = %err, "falling back to raw value");
                            value.to_string()
                        }),
                        None => value.to_string(),
                    };
                    formatted.insert(name.clone(), display);
                }
                let mut summary = serde_json::to_string(&source).unwrap_or_default();
                if summary.chars().count() > max_summary {
                    summary = summary.chars().take(max_summary).collect();
                }
                formatted.insert(SOURCE_FIELD.to_string(), summary);
                HitRow { source, formatted }
            })
            .collect();

        self.total_hits = response.total_hits;
        self.rows = rows;
        tracing::debug!(hits = self.total_hits, rows = self.rows.len(), "results applied");
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn app_state(&self) -> &AppState {
        &self.state
    }

    pub fn app_state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    pub fn catalog(&self) -> Option<&FieldCatalog> {
        self.catalog.as_ref()
    }

    pub fn query_definition(&self) -> &QueryDefinition {
        &self.query_def
    }

    pub fn time_field(&self) -> Option<&str> {
        self.time_field.as_deref()
    }

    pub fn time_filter_enabled(&self) -> bool {
        self.time_filter_enabled
    }

    pub fn visualization(&self) -> Option<&VisHandle> {
        self.vis.as_ref()
    }

    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    pub fn rows(&self) -> &[HitRow] {
        &self.rows
    }
}
