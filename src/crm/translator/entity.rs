use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::crm::translator::cache::EntityCache;
use crate::crm::translator::codec::{
    self, ENTITIES_SHEET, RowLayout, SheetTable, TranslationRow,
};
use crate::crm::translator::dispatch;
use crate::crm::translator::error::Result;
use crate::crm::translator::labels;
use crate::crm::translator::model::{EntityMetadata, FieldKind, LanguageCode};
use crate::crm::translator::outcome::Outcome;
use crate::crm::translator::settings::{ExportSettings, ImportOptions};
use crate::crm::translator::store::{EntityUpdate, MetadataStore, UpdateRequest};

/// Builds the `Entities` sheet.
///
/// Entities without an identifier are left out. Each remaining entity gets a
/// `DisplayName` and a `DisplayCollectionName` row when names are exported,
/// and a `Description` row when descriptions are.
pub fn export(
    entities: &[EntityMetadata],
    languages: &[LanguageCode],
    settings: &ExportSettings,
) -> SheetTable {
    let mut ordered: Vec<&EntityMetadata> = entities
        .iter()
        .filter(|entity| entity.metadata_id.is_some())
        .collect();
    ordered.sort_by(|lhs, rhs| lhs.logical_name.cmp(&rhs.logical_name));

    let mut kinds = Vec::new();
    if settings.export_names {
        kinds.extend([FieldKind::DisplayName, FieldKind::DisplayCollectionName]);
    }
    if settings.export_descriptions {
        kinds.push(FieldKind::Description);
    }

    let mut rows = Vec::new();
    for entity in ordered {
        for kind in &kinds {
            let row = TranslationRow {
                row: rows.len() + 1,
                owner_id: entity.metadata_id,
                entity: entity.logical_name.clone(),
                attribute: None,
                kind: *kind,
                cells: languages
                    .iter()
                    .map(|code| labels::text_or_empty(entity.label(*kind), *code))
                    .collect(),
            };
            rows.push(codec::encode_row(RowLayout::Entity, &row));
        }
    }

    SheetTable {
        sheet_name: ENTITIES_SHEET.to_string(),
        columns: codec::header(RowLayout::Entity, languages),
        rows,
    }
}

/// Merges an `Entities` sheet into the resolved entities and sends one
/// update per changed entity.
///
/// Entities that are not renameable or whose merged display name is empty
/// are reported as skipped rather than sent.
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
    let decoded = codec::decode_sheet(RowLayout::Entity, table)?;
    let mut outcomes = Vec::new();

    let mut touched: Vec<String> = Vec::new();
    let mut changed: HashSet<String> = HashSet::new();
    let mut missing: HashSet<String> = HashSet::new();

    for row in decoded.rows {
        let row = match row {
            Ok(row) => row,
            Err(error) => {
                outcomes.push(Outcome::failure(sheet, error.to_string()));
                continue;
            }
        };
        if missing.contains(&row.entity) {
            continue;
        }

        let Some(entity) = cache.resolve(&*store, &row.entity)? else {
            outcomes.push(Outcome::failure(
                sheet,
                format!("Entity {} is missing in the store", row.entity),
            ));
            missing.insert(row.entity.clone());
            continue;
        };

        let cells = row
            .language_cells(&decoded.languages)
            .filter(|(code, _)| options.applies_to(*code));
        let row_changed =
            labels::merge_cells(entity.label_mut(row.kind), cells, options.allow_blank);

        if !touched.contains(&row.entity) {
            touched.push(row.entity.clone());
        }
        if row_changed {
            changed.insert(row.entity.clone());
        }
    }

    let mut requests = Vec::new();
    for name in touched.iter().filter(|name| changed.contains(*name)) {
        let Some(entity) = cache.get(name) else {
            continue;
        };
        if !entity.is_renameable {
            outcomes.push(Outcome::skipped(
                sheet,
                format!("Entity {name} is not renameable"),
            ));
        } else if !labels::has_text(entity.display_name.as_ref()) {
            outcomes.push(Outcome::skipped(
                sheet,
                format!("Entity {name} has no display name"),
            ));
        } else {
            requests.push(UpdateRequest::UpdateEntity(EntityUpdate::from(entity)));
        }
    }

    debug!(
        entities = touched.len(),
        updates = requests.len(),
        "entity labels merged"
    );
    outcomes.extend(dispatch::submit_batches(
        store,
        sheet,
        requests,
        options.entity_batch_size,
    ));
    Ok(outcomes)
}
