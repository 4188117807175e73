#![allow(dead_code)]

use crm_translator::model::{
    AttributeMetadata, AttributeType, EntityMetadata, Label, LanguageCode,
};
use crm_translator::store::{Catalog, InMemoryStore};

pub const ENGLISH: u32 = 1033;
pub const FRENCH: u32 = 1036;

pub fn lcid(code: u32) -> LanguageCode {
    LanguageCode::new(code).expect("valid lcid")
}

pub fn label(pairs: &[(u32, &str)]) -> Label {
    pairs
        .iter()
        .map(|(code, text)| (lcid(*code), text.to_string()))
        .collect()
}

pub fn attribute(name: &str, kind: AttributeType, display: &[(u32, &str)]) -> AttributeMetadata {
    let mut attribute = AttributeMetadata::new(name, kind);
    attribute.display_name = Some(label(display));
    attribute
}

pub fn account() -> EntityMetadata {
    let mut entity = EntityMetadata::new("account");
    entity.display_name = Some(label(&[(ENGLISH, "Account"), (FRENCH, "Compte")]));
    entity.display_collection_name = Some(label(&[(ENGLISH, "Accounts")]));
    entity.description = Some(label(&[(ENGLISH, "Business that represents a customer")]));

    let mut sub_field = attribute("primarycontactidname", AttributeType::String, &[(ENGLISH, "Primary Contact")]);
    sub_field.attribute_of = Some("primarycontactid".into());

    let mut locked = attribute("statecode", AttributeType::State, &[(ENGLISH, "Status")]);
    locked.is_renameable = false;

    let mut anonymous = attribute("importsequencenumber", AttributeType::Integer, &[]);
    anonymous.metadata_id = None;

    let mut described = attribute("name", AttributeType::String, &[(ENGLISH, "Account Name")]);
    described.description = Some(label(&[(ENGLISH, "Type the company or business name.")]));

    entity
        .with_attribute(described)
        .with_attribute(attribute("accountid", AttributeType::Uniqueidentifier, &[(ENGLISH, "Account")]))
        .with_attribute(attribute("entityimage", AttributeType::Virtual, &[(ENGLISH, "Entity Image")]))
        .with_attribute(attribute("hobbies", AttributeType::MultiSelectPicklist, &[(ENGLISH, "Hobbies")]))
        .with_attribute(attribute("revenue", AttributeType::Money, &[(ENGLISH, "Annual Revenue")]))
        .with_attribute(attribute("revenue_state", AttributeType::Integer, &[(ENGLISH, "Revenue (State)")]))
        .with_attribute(attribute("revenue_date", AttributeType::DateTime, &[(ENGLISH, "Revenue (Last Updated On)")]))
        .with_attribute(attribute("blankname", AttributeType::String, &[(ENGLISH, "")]))
        .with_attribute(sub_field)
        .with_attribute(locked)
        .with_attribute(anonymous)
}

pub fn contact() -> EntityMetadata {
    let mut entity = EntityMetadata::new("contact");
    entity.display_name = Some(label(&[(ENGLISH, "Contact")]));
    entity.display_collection_name = Some(label(&[(ENGLISH, "Contacts")]));
    entity.with_attribute(attribute("fullname", AttributeType::String, &[(ENGLISH, "Full Name")]))
}

pub fn catalog() -> Catalog {
    Catalog {
        user_id: uuid::Uuid::new_v4(),
        languages: vec![lcid(FRENCH), lcid(ENGLISH)],
        entities: vec![contact(), account()],
    }
}

pub fn store() -> InMemoryStore {
    InMemoryStore::new(catalog())
}

/// Text stored in `store` for one language of an entity label.
pub fn entity_text(
    store: &InMemoryStore,
    entity: &str,
    select: impl Fn(&EntityMetadata) -> Option<&Label>,
    code: u32,
) -> Option<String> {
    let entity = store.entity(entity)?;
    let label = select(entity)?;
    crm_translator::labels::text(label, lcid(code)).map(str::to_string)
}

/// Text stored in `store` for one language of an attribute display name.
pub fn attribute_text(store: &InMemoryStore, entity: &str, attribute: &str, code: u32) -> Option<String> {
    let entity = store.entity(entity)?;
    let attribute = entity
        .attributes
        .iter()
        .find(|candidate| candidate.logical_name == attribute)?;
    crm_translator::labels::text(attribute.display_name.as_ref()?, lcid(code)).map(str::to_string)
}
