//! Fixture-driven schema lookup.

use async_trait::async_trait;
use fathom_core::error::SchemaLookupError;
use fathom_core::field_catalog::FieldDescriptor;
use fathom_core::remote::SchemaLookup;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

/// In-memory [`SchemaLookup`] backed by per-index descriptor fixtures.
///
/// Every lookup is recorded, so tests can assert how many schema calls a
/// scenario issued and for which index.
#[derive(Default)]
pub struct InMemorySchemaLookup {
    indices: BTreeMap<String, Vec<FieldDescriptor>>,
    failing: Rc<RefCell<BTreeSet<String>>>,
    lookups: Rc<RefCell<Vec<String>>>,
}

impl InMemorySchemaLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register fixture descriptors for an index.
    pub fn with_index(mut self, id: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        self.indices.insert(id.into(), fields);
        self
    }

    /// Make lookups for `id` reject with a [`SchemaLookupError`].
    pub fn with_failing_index(self, id: impl Into<String>) -> Self {
        self.failing.borrow_mut().insert(id.into());
        self
    }

    /// Shared handle to the failing-index set; lets a test start failing an
    /// index after the adapter has been boxed into the orchestrator.
    pub fn failing_handle(&self) -> Rc<RefCell<BTreeSet<String>>> {
        Rc::clone(&self.failing)
    }

    /// Shared handle to the recorded lookup log. Clone it out before boxing
    /// the adapter into the orchestrator.
    pub fn lookup_log(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.lookups)
    }
}

#[async_trait(?Send)]
impl SchemaLookup for InMemorySchemaLookup {
    async fn fields_for(
        &self,
        index: &str,
    ) -> Result<Option<Vec<FieldDescriptor>>, SchemaLookupError> {
        self.lookups.borrow_mut().push(index.to_string());
        tracing::debug!(index, "schema lookup");

        if self.failing.borrow().contains(index) {
            return Err(SchemaLookupError {
                index: index.to_string(),
                reason: "simulated schema failure".to_string(),
            });
        }
        // an index with no fixture has no mapped fields yet
        Ok(self.indices.get(index).cloned())
    }
}
