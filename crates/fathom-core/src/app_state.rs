//! App state — a persisted, change-observable container for [`SearchState`].
//!
//! Mutations accumulate silently; [`AppState::commit`] is the explicit
//! boundary that diffs against the previously committed snapshot, persists
//! the new one, and notifies listeners with the changed-key set. Listeners
//! run in registration order, always after the diff is fully computed, so
//! they never observe a torn state.

use crate::remote::StateStore;
use crate::types::{SearchState, SortSpec, StateKey, SOURCE_FIELD};
use serde::Deserialize;
use std::collections::BTreeSet;

/// A partial snapshot recovered from the external store (URL, back-forward
/// history, or a saved document). Missing keys fall back to the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateOverlay {
    pub query: Option<String>,
    pub columns: Option<Vec<String>>,
    pub sort: Option<SortSpec>,
    pub index: Option<String>,
}

type ChangeListener = Box<dyn FnMut(&BTreeSet<StateKey>)>;

/// Change-observable search state with an explicit commit boundary.
pub struct AppState {
    state: SearchState,
    committed: SearchState,
    listeners: Vec<ChangeListener>,
    store: Option<Box<dyn StateStore>>,
}

impl AppState {
    /// Build from defaults merged with an optional recovered snapshot.
    ///
    /// The merged state is also the initial committed snapshot, so the first
    /// commit only reports keys mutated after construction.
    pub fn new(defaults: SearchState, recovered: Option<StateOverlay>) -> Self {
        let mut state = defaults;
        if let Some(overlay) = recovered {
            if let Some(query) = overlay.query {
                state.query = query;
            }
            if let Some(columns) = overlay.columns {
                state.columns = columns;
            }
            if let Some(sort) = overlay.sort {
                state.sort = sort;
            }
            if let Some(index) = overlay.index {
                state.index = index;
            }
        }
        normalize_columns(&mut state.columns);

        AppState {
            committed: state.clone(),
            state,
            listeners: Vec::new(),
            store: None,
        }
    }

    /// Attach the write side of the persisted-state codec. Every committed
    /// change is written back through it.
    pub fn with_store(mut self, store: Box<dyn StateStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn query(&self) -> &str {
        &self.state.query
    }

    pub fn columns(&self) -> &[String] {
        &self.state.columns
    }

    pub fn sort(&self) -> &SortSpec {
        &self.state.sort
    }

    pub fn index(&self) -> &str {
        &self.state.index
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.query = query.into();
    }

    pub fn set_columns(&mut self, columns: Vec<String>) {
        self.state.columns = columns;
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.state.sort = sort;
    }

    pub fn set_index(&mut self, index: impl Into<String>) {
        self.state.index = index.into();
    }

    /// Register a change listener. Listeners are invoked in registration
    /// order and are never removed automatically; the owning view drops the
    /// whole container at teardown.
    pub fn on_update(&mut self, listener: impl FnMut(&BTreeSet<StateKey>) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Commit pending mutations.
    ///
    /// Normalizes the columns invariant, diffs against the previous committed
    /// snapshot, and — iff anything changed — persists the snapshot and
    /// invokes every listener exactly once with the changed-key set. Returns
    /// the set either way (empty means no listener ran).
    pub fn commit(&mut self) -> BTreeSet<StateKey> {
        normalize_columns(&mut self.state.columns);

        let mut changed = BTreeSet::new();
        if self.state.query != self.committed.query {
            changed.insert(StateKey::Query);
        }
        if self.state.columns != self.committed.columns {
            changed.insert(StateKey::Columns);
        }
        if self.state.sort != self.committed.sort {
            changed.insert(StateKey::Sort);
        }
        if self.state.index != self.committed.index {
            changed.insert(StateKey::Index);
        }

        if changed.is_empty() {
            return changed;
        }

        tracing::debug!(?changed, "state committed");
        self.committed = self.state.clone();
        if let Some(store) = &mut self.store {
            store.save(&self.state);
        }
        for listener in &mut self.listeners {
            listener(&changed);
        }
        changed
    }
}

/// Columns are unique and never empty; an emptied list resets to `_source`.
fn normalize_columns(columns: &mut Vec<String>) {
    let mut seen = BTreeSet::new();
    columns.retain(|name| seen.insert(name.clone()));
    if columns.is_empty() {
        columns.push(SOURCE_FIELD.to_string());
    }
}
