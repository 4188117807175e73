use crate::crm::translator::labels;
use crate::crm::translator::model::{AttributeMetadata, AttributeType, EntityMetadata};

const STATE_SUFFIX: &str = "_state";
const DATE_SUFFIX: &str = "_date";

/// Decides whether an attribute's labels take part in translation.
///
/// System kinds, sub-fields, attributes without an identifier, locked
/// attributes, and attributes without any display text are excluded, as are
/// the `_state`/`_date` companions generated for calculated fields.
pub fn is_translatable(attribute: &AttributeMetadata, entity: &EntityMetadata) -> bool {
    let Some(kind) = attribute.attribute_type else {
        return false;
    };
    if is_excluded_kind(kind)
        || attribute.attribute_of.is_some()
        || attribute.metadata_id.is_none()
        || !attribute.is_renameable
    {
        return false;
    }

    if let Some(display_name) = &attribute.display_name {
        if !labels::has_text(Some(display_name)) {
            return false;
        }
    }

    !is_derived_companion(&attribute.logical_name, entity)
}

fn is_excluded_kind(kind: AttributeType) -> bool {
    matches!(
        kind,
        AttributeType::BigInt
            | AttributeType::CalendarRules
            | AttributeType::EntityName
            | AttributeType::ManagedProperty
            | AttributeType::Uniqueidentifier
            | AttributeType::Virtual
    )
}

fn is_derived_companion(logical_name: &str, entity: &EntityMetadata) -> bool {
    let has_sibling = |name: &str| {
        entity
            .attributes
            .iter()
            .any(|attribute| attribute.logical_name == name)
    };

    if let Some(base) = logical_name.strip_suffix(STATE_SUFFIX) {
        if has_sibling(base) && has_sibling(&format!("{base}{DATE_SUFFIX}")) {
            return true;
        }
    }
    if let Some(base) = logical_name.strip_suffix(DATE_SUFFIX) {
        if has_sibling(base) && has_sibling(&format!("{base}{STATE_SUFFIX}")) {
            return true;
        }
    }
    false
}

/// Attributes of `entity` that pass [`is_translatable`], ordered by logical
/// name.
pub fn translatable_attributes(entity: &EntityMetadata) -> Vec<&AttributeMetadata> {
    let mut attributes: Vec<&AttributeMetadata> = entity
        .attributes
        .iter()
        .filter(|attribute| is_translatable(attribute, entity))
        .collect();
    attributes.sort_by(|lhs, rhs| lhs.logical_name.cmp(&rhs.logical_name));
    attributes
}
