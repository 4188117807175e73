use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::crm::translator::attribute;
use crate::crm::translator::cache::EntityCache;
use crate::crm::translator::codec::{ATTRIBUTES_SHEET, ENTITIES_SHEET, WorkbookData};
use crate::crm::translator::entity;
use crate::crm::translator::error::Result;
use crate::crm::translator::io::{excel_read, excel_write};
use crate::crm::translator::model::EntityMetadata;
use crate::crm::translator::outcome::Outcome;
use crate::crm::translator::settings::{ExportSettings, ImportOptions};
use crate::crm::translator::store::{EntityFilters, MetadataStore};

/// Builds the translation workbook for the entities selected by `settings`.
#[instrument(level = "info", skip_all, fields(entities = settings.entities.len()))]
pub fn export<S>(settings: &ExportSettings, store: &S) -> Result<WorkbookData>
where
    S: MetadataStore + ?Sized,
{
    let languages = store.provisioned_languages()?;
    let entities = select_entities(settings, store)?;
    info!(
        entity_count = entities.len(),
        language_count = languages.len(),
        "catalog loaded for export"
    );

    let unsupported = settings.unsupported_categories();
    if !unsupported.is_empty() {
        warn!(categories = %unsupported.join(", "), "categories have no translator and are skipped");
    }

    let mut tables = Vec::new();
    if settings.export_entities {
        tables.push(entity::export(&entities, &languages, settings));
    }
    if settings.export_attributes {
        tables.push(attribute::export(&entities, &languages, settings));
    }
    Ok(WorkbookData { tables })
}

/// Exports and writes the workbook to `settings.file_path`.
#[instrument(level = "info", skip_all, fields(output = %settings.file_path.display()))]
pub fn export_to_file<S>(settings: &ExportSettings, store: &S) -> Result<()>
where
    S: MetadataStore + ?Sized,
{
    let workbook = export(settings, store)?;
    excel_write::write_workbook(&settings.file_path, &workbook)
}

fn select_entities<S>(settings: &ExportSettings, store: &S) -> Result<Vec<EntityMetadata>>
where
    S: MetadataStore + ?Sized,
{
    if settings.entities.is_empty() {
        return store.list_entities(EntityFilters::ALL);
    }

    let mut entities = Vec::with_capacity(settings.entities.len());
    for name in &settings.entities {
        match store.retrieve_entity(name, EntityFilters::ALL)? {
            Some(entity) => entities.push(entity),
            None => warn!(entity = %name, "entity not found in the store; skipped"),
        }
    }
    Ok(entities)
}

/// Imports one workbook. Sheets are handled in workbook order and share one
/// [`EntityCache`]; sheets without a translator are reported as skipped.
#[instrument(level = "info", skip_all, fields(input = %input.display()))]
pub fn import_file<S>(input: &Path, store: &mut S, options: &ImportOptions) -> Result<Vec<Outcome>>
where
    S: MetadataStore + ?Sized,
{
    let workbook = excel_read::read_workbook(input)?;
    import_workbook(&workbook, store, options)
}

/// Imports already loaded workbook data.
pub fn import_workbook<S>(
    workbook: &WorkbookData,
    store: &mut S,
    options: &ImportOptions,
) -> Result<Vec<Outcome>>
where
    S: MetadataStore + ?Sized,
{
    let mut cache = EntityCache::new();
    let mut outcomes = Vec::new();

    for table in &workbook.tables {
        info!(sheet = %table.sheet_name, rows = table.rows.len(), "processing sheet");
        if table.sheet_name.eq_ignore_ascii_case(ENTITIES_SHEET) {
            outcomes.extend(entity::import(table, &mut cache, store, options)?);
        } else if table.sheet_name.eq_ignore_ascii_case(ATTRIBUTES_SHEET) {
            outcomes.extend(attribute::import(table, &mut cache, store, options)?);
        } else {
            outcomes.push(Outcome::skipped(
                &table.sheet_name,
                "sheet has no translator",
            ));
        }
    }

    debug!(cached_entities = cache.len(), "workbook imported");
    Ok(outcomes)
}
