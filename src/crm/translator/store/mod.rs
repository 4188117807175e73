//! Boundary with the remote metadata store.
//!
//! The engine only ever talks to the store through [`MetadataStore`]; label
//! updates are always wrapped in an [`ExecuteMultipleRequest`].

pub mod memory;

use uuid::Uuid;

use crate::crm::translator::error::Result;
use crate::crm::translator::model::{AttributeMetadata, EntityMetadata, Label, LanguageCode};

pub use memory::{Catalog, InMemoryStore};

/// Detail selected when retrieving entity metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityFilters {
    pub entity: bool,
    pub attributes: bool,
    pub relationships: bool,
}

impl EntityFilters {
    /// Entity, attributes and relationships.
    pub const ALL: EntityFilters = EntityFilters {
        entity: true,
        attributes: true,
        relationships: true,
    };
}

/// Label-only projection of an entity sent with an update.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityUpdate {
    pub logical_name: String,
    pub display_name: Option<Label>,
    pub display_collection_name: Option<Label>,
    pub description: Option<Label>,
}

impl From<&EntityMetadata> for EntityUpdate {
    fn from(entity: &EntityMetadata) -> Self {
        Self {
            logical_name: entity.logical_name.clone(),
            display_name: entity.display_name.clone(),
            display_collection_name: entity.display_collection_name.clone(),
            description: entity.description.clone(),
        }
    }
}

/// A single metadata update operation.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateRequest {
    UpdateEntity(EntityUpdate),
    UpdateAttribute {
        entity_logical_name: String,
        attribute: AttributeMetadata,
    },
}

impl UpdateRequest {
    /// Short human readable name of the updated object.
    pub fn target(&self) -> String {
        match self {
            UpdateRequest::UpdateEntity(entity) => entity.logical_name.clone(),
            UpdateRequest::UpdateAttribute {
                entity_logical_name,
                attribute,
            } => format!("{entity_logical_name}.{}", attribute.logical_name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecuteMultipleSettings {
    pub continue_on_error: bool,
    pub return_responses: bool,
}

/// Several operations submitted as one call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteMultipleRequest {
    pub requests: Vec<UpdateRequest>,
    pub settings: ExecuteMultipleSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub message: String,
}

/// Per-operation entry of an [`ExecuteMultipleResponse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteMultipleResponseItem {
    pub request_index: usize,
    pub fault: Option<Fault>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecuteMultipleResponse {
    pub is_faulted: bool,
    pub responses: Vec<ExecuteMultipleResponseItem>,
}

/// Operations consumed from the metadata store.
///
/// An `Err` from any method is a transport-level failure of the call itself;
/// per-operation faults are carried inside [`ExecuteMultipleResponse`].
pub trait MetadataStore {
    /// Identity probe used to verify connectivity.
    fn who_am_i(&self) -> Result<Uuid>;

    /// Languages provisioned in the store, ascending.
    fn provisioned_languages(&self) -> Result<Vec<LanguageCode>>;

    /// Every entity of the catalog with the requested detail.
    fn list_entities(&self, filters: EntityFilters) -> Result<Vec<EntityMetadata>>;

    /// Retrieves one entity by logical name; `Ok(None)` when it does not
    /// exist.
    fn retrieve_entity(
        &self,
        logical_name: &str,
        filters: EntityFilters,
    ) -> Result<Option<EntityMetadata>>;

    fn execute_multiple(
        &mut self,
        request: &ExecuteMultipleRequest,
    ) -> Result<ExecuteMultipleResponse>;
}
