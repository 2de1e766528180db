//! Static index-pattern registry.

use fathom_core::remote::IndexRegistry;
use std::collections::BTreeSet;

/// [`IndexRegistry`] over a fixed set of index-pattern ids.
#[derive(Debug, Clone, Default)]
pub struct StaticIndexRegistry {
    known: BTreeSet<String>,
    default: Option<String>,
}

impl StaticIndexRegistry {
    pub fn new(known: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            known: known.into_iter().map(Into::into).collect(),
            default: None,
        }
    }

    pub fn with_default(mut self, id: impl Into<String>) -> Self {
        self.default = Some(id.into());
        self
    }
}

impl IndexRegistry for StaticIndexRegistry {
    fn known_index_ids(&self) -> BTreeSet<String> {
        self.known.clone()
    }

    fn default_index_id(&self) -> Option<String> {
        self.default.clone()
    }
}
