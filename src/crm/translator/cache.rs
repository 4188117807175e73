use std::collections::HashMap;

use tracing::debug;

use crate::crm::translator::error::Result;
use crate::crm::translator::model::EntityMetadata;
use crate::crm::translator::store::{EntityFilters, MetadataStore};

/// Entities resolved during one import run, keyed by logical name.
///
/// Entities are fetched with full detail the first time a row references
/// them and then mutated in place as labels are merged. Misses are cached
/// too, so a deleted entity is only looked up once.
#[derive(Debug, Default)]
pub struct EntityCache {
    entries: HashMap<String, Option<EntityMetadata>>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached entity, fetching it from `store` on first use.
    /// `Ok(None)` means the store has no entity of that name.
    pub fn resolve<S>(
        &mut self,
        store: &S,
        logical_name: &str,
    ) -> Result<Option<&mut EntityMetadata>>
    where
        S: MetadataStore + ?Sized,
    {
        if !self.entries.contains_key(logical_name) {
            let fetched = store.retrieve_entity(logical_name, EntityFilters::ALL)?;
            debug!(entity = logical_name, found = fetched.is_some(), "entity resolved");
            self.entries.insert(logical_name.to_string(), fetched);
        }
        Ok(self
            .entries
            .get_mut(logical_name)
            .and_then(Option::as_mut))
    }

    /// Returns an already resolved entity without touching the store.
    pub fn get(&self, logical_name: &str) -> Option<&EntityMetadata> {
        self.entries.get(logical_name).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.entries.values().filter(|entry| entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
