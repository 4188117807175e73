use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::crm::translator::error::{Result, TranslatorError};
use crate::crm::translator::model::{EntityMetadata, LanguageCode};
use crate::crm::translator::store::{
    EntityFilters, EntityUpdate, ExecuteMultipleRequest, ExecuteMultipleResponse,
    ExecuteMultipleResponseItem, Fault, MetadataStore, UpdateRequest,
};

/// Snapshot of a metadata catalog as persisted on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub user_id: Uuid,
    #[serde(default)]
    pub languages: Vec<LanguageCode>,
    #[serde(default)]
    pub entities: Vec<EntityMetadata>,
}

/// In-process metadata store backed by a [`Catalog`].
///
/// Updates are applied to the catalog immediately. Faults can be scripted per
/// target and per submission, which is how the continue-on-error paths are
/// exercised without a live store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    catalog: Catalog,
    faulted_targets: HashSet<String>,
    failing_submissions: HashSet<usize>,
    submissions: Vec<usize>,
}

impl InMemoryStore {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    /// Loads a catalog snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TranslatorError::MissingInput(path.to_path_buf()));
        }
        let source = fs::read_to_string(path)?;
        let catalog: Catalog = serde_json::from_str(&source)?;
        debug!(
            path = %path.display(),
            entity_count = catalog.entities.len(),
            "catalog snapshot loaded"
        );
        Ok(Self::new(catalog))
    }

    /// Writes the current catalog back to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.catalog)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn entity(&self, logical_name: &str) -> Option<&EntityMetadata> {
        self.catalog
            .entities
            .iter()
            .find(|entity| entity.logical_name == logical_name)
    }

    /// Makes every update of `target` fault. Targets use the
    /// [`UpdateRequest::target`] naming.
    pub fn fault_on(&mut self, target: impl Into<String>) {
        self.faulted_targets.insert(target.into());
    }

    /// Makes the zero-based `index`-th submission fail as a whole.
    pub fn fail_submission(&mut self, index: usize) {
        self.failing_submissions.insert(index);
    }

    /// Number of operations in each submission received so far.
    pub fn submissions(&self) -> &[usize] {
        &self.submissions
    }

    fn apply(&mut self, request: &UpdateRequest) -> std::result::Result<(), String> {
        let target = request.target();
        if self.faulted_targets.contains(&target) {
            return Err(format!("update of {target} was rejected"));
        }

        match request {
            UpdateRequest::UpdateEntity(update) => self.apply_entity(update),
            UpdateRequest::UpdateAttribute {
                entity_logical_name,
                attribute,
            } => {
                let entity = self
                    .catalog
                    .entities
                    .iter_mut()
                    .find(|entity| entity.logical_name == *entity_logical_name)
                    .ok_or_else(|| format!("entity {entity_logical_name} does not exist"))?;
                let existing = entity.attribute_mut(&attribute.logical_name).ok_or_else(|| {
                    format!(
                        "attribute {entity_logical_name}.{} does not exist",
                        attribute.logical_name
                    )
                })?;
                if !existing.is_renameable {
                    return Err(format!("attribute {target} cannot be renamed"));
                }
                if attribute.display_name.is_some() {
                    existing.display_name = attribute.display_name.clone();
                }
                if attribute.description.is_some() {
                    existing.description = attribute.description.clone();
                }
                Ok(())
            }
        }
    }

    fn apply_entity(&mut self, update: &EntityUpdate) -> std::result::Result<(), String> {
        let entity = self
            .catalog
            .entities
            .iter_mut()
            .find(|entity| entity.logical_name == update.logical_name)
            .ok_or_else(|| format!("entity {} does not exist", update.logical_name))?;
        if !entity.is_renameable {
            return Err(format!("entity {} cannot be renamed", update.logical_name));
        }
        if update.display_name.is_some() {
            entity.display_name = update.display_name.clone();
        }
        if update.display_collection_name.is_some() {
            entity.display_collection_name = update.display_collection_name.clone();
        }
        if update.description.is_some() {
            entity.description = update.description.clone();
        }
        Ok(())
    }
}

impl MetadataStore for InMemoryStore {
    fn who_am_i(&self) -> Result<Uuid> {
        Ok(self.catalog.user_id)
    }

    fn provisioned_languages(&self) -> Result<Vec<LanguageCode>> {
        let mut languages = self.catalog.languages.clone();
        languages.sort();
        languages.dedup();
        Ok(languages)
    }

    fn list_entities(&self, filters: EntityFilters) -> Result<Vec<EntityMetadata>> {
        Ok(self
            .catalog
            .entities
            .iter()
            .map(|entity| project(entity, filters))
            .collect())
    }

    fn retrieve_entity(
        &self,
        logical_name: &str,
        filters: EntityFilters,
    ) -> Result<Option<EntityMetadata>> {
        Ok(self.entity(logical_name).map(|entity| project(entity, filters)))
    }

    #[instrument(level = "debug", skip_all, fields(operations = request.requests.len()))]
    fn execute_multiple(
        &mut self,
        request: &ExecuteMultipleRequest,
    ) -> Result<ExecuteMultipleResponse> {
        let index = self.submissions.len();
        self.submissions.push(request.requests.len());
        if self.failing_submissions.contains(&index) {
            return Err(TranslatorError::Store(format!(
                "submission {index} could not be delivered"
            )));
        }

        let mut response = ExecuteMultipleResponse::default();
        for (request_index, operation) in request.requests.iter().enumerate() {
            match self.apply(operation) {
                Ok(()) => {
                    if request.settings.return_responses {
                        response.responses.push(ExecuteMultipleResponseItem {
                            request_index,
                            fault: None,
                        });
                    }
                }
                Err(message) => {
                    response.is_faulted = true;
                    response.responses.push(ExecuteMultipleResponseItem {
                        request_index,
                        fault: Some(Fault { message }),
                    });
                    if !request.settings.continue_on_error {
                        break;
                    }
                }
            }
        }
        Ok(response)
    }
}

fn project(entity: &EntityMetadata, filters: EntityFilters) -> EntityMetadata {
    let mut projected = entity.clone();
    if !filters.attributes {
        projected.attributes.clear();
    }
    projected
}
