use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::crm::translator::cache::EntityCache;
use crate::crm::translator::codec::{
    self, ATTRIBUTES_SHEET, RowLayout, SheetTable, TranslationRow,
};
use crate::crm::translator::dispatch;
use crate::crm::translator::error::Result;
use crate::crm::translator::filter;
use crate::crm::translator::labels;
use crate::crm::translator::model::{EntityMetadata, FieldKind, LanguageCode};
use crate::crm::translator::outcome::Outcome;
use crate::crm::translator::settings::{ExportSettings, ImportOptions};
use crate::crm::translator::store::{MetadataStore, UpdateRequest};

/// Builds the `Attributes` sheet from the translatable attributes of
/// `entities`.
pub fn export(
    entities: &[EntityMetadata],
    languages: &[LanguageCode],
    settings: &ExportSettings,
) -> SheetTable {
    let mut ordered: Vec<&EntityMetadata> = entities.iter().collect();
    ordered.sort_by(|lhs, rhs| lhs.logical_name.cmp(&rhs.logical_name));

    let mut kinds = Vec::new();
    if settings.export_names {
        kinds.push(FieldKind::DisplayName);
    }
    if settings.export_descriptions {
        kinds.push(FieldKind::Description);
    }

    let mut rows = Vec::new();
    for entity in ordered {
        for attribute in filter::translatable_attributes(entity) {
            for kind in &kinds {
                let row = TranslationRow {
                    row: rows.len() + 1,
                    owner_id: attribute.metadata_id,
                    entity: entity.logical_name.clone(),
                    attribute: Some(attribute.logical_name.clone()),
                    kind: *kind,
                    cells: languages
                        .iter()
                        .map(|code| labels::text_or_empty(attribute.label(*kind), *code))
                        .collect(),
                };
                rows.push(codec::encode_row(RowLayout::Attribute, &row));
            }
        }
    }

    SheetTable {
        sheet_name: ATTRIBUTES_SHEET.to_string(),
        columns: codec::header(RowLayout::Attribute, languages),
        rows,
    }
}

type AttributeKey = (String, String);

/// Merges an `Attributes` sheet into the resolved entities and sends the
/// changed attributes in batches of `options.attribute_batch_size`.
///
/// Rows for attributes that no longer exist are reported once per attribute
/// and skipped.
#[instrument(level = "info", skip_all, fields(sheet = %table.sheet_name))]
pub fn import<S>(
    table: &SheetTable,
    cache: &mut EntityCache,
    store: &mut S,
    options: &ImportOptions,
) -> Result<Vec<Outcome>>
where
    S: MetadataStore + ?Sized,
{
    let sheet = table.sheet_name.as_str();
    let decoded = codec::decode_sheet(RowLayout::Attribute, table)?;
    let mut outcomes = Vec::new();

    let mut touched: Vec<AttributeKey> = Vec::new();
    let mut changed: HashSet<AttributeKey> = HashSet::new();
    let mut missing: HashSet<AttributeKey> = HashSet::new();

    for row in decoded.rows {
        let row = match row {
            Ok(row) => row,
            Err(error) => {
                outcomes.push(Outcome::failure(sheet, error.to_string()));
                continue;
            }
        };
        let attribute_name = row.attribute.clone().unwrap_or_default();
        let requested = (row.entity.clone(), attribute_name.to_ascii_lowercase());
        if missing.contains(&requested) {
            continue;
        }

        let attribute = match cache.resolve(&*store, &row.entity)? {
            Some(entity) => entity.attribute_mut(&attribute_name),
            None => None,
        };
        let Some(attribute) = attribute else {
            outcomes.push(Outcome::failure(
                sheet,
                format!(
                    "Attribute {} - {attribute_name} is missing in the store",
                    row.entity
                ),
            ));
            missing.insert(requested);
            continue;
        };

        let Some(label) = attribute.label_mut(row.kind) else {
            outcomes.push(Outcome::failure(
                sheet,
                format!("row {}: {} is not an attribute field", row.row, row.kind),
            ));
            continue;
        };
        let cells = row
            .language_cells(&decoded.languages)
            .filter(|(code, _)| options.applies_to(*code));
        let row_changed = labels::merge_cells(label, cells, options.allow_blank);

        let key = (row.entity.clone(), attribute.logical_name.clone());
        if row_changed {
            changed.insert(key.clone());
        }
        if !touched.contains(&key) {
            touched.push(key);
        }
    }

    let mut requests = Vec::new();
    for key in touched.iter().filter(|key| changed.contains(*key)) {
        let (entity_name, attribute_name) = key;
        let Some(attribute) = cache.get(entity_name).and_then(|entity| {
            entity
                .attributes
                .iter()
                .find(|attribute| attribute.logical_name == *attribute_name)
        }) else {
            continue;
        };
        if !attribute.is_renameable {
            outcomes.push(Outcome::skipped(
                sheet,
                format!("Attribute {entity_name} - {attribute_name} is not renameable"),
            ));
        } else if !labels::has_text(attribute.display_name.as_ref()) {
            outcomes.push(Outcome::skipped(
                sheet,
                format!("Attribute {entity_name} - {attribute_name} has no display name"),
            ));
        } else {
            requests.push(UpdateRequest::UpdateAttribute {
                entity_logical_name: entity_name.clone(),
                attribute: attribute.clone(),
            });
        }
    }

    debug!(
        attributes = touched.len(),
        updates = requests.len(),
        "attribute labels merged"
    );
    outcomes.extend(dispatch::submit_batches(
        store,
        sheet,
        requests,
        options.attribute_batch_size,
    ));
    Ok(outcomes)
}
