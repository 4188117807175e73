use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::crm::translator::codec::{ENTITIES_SHEET, SheetTable, WorkbookData};
use crate::crm::translator::dispatch::{ATTRIBUTE_BATCH_SIZE, ENTITY_BATCH_SIZE};
use crate::crm::translator::error::Result;
use crate::crm::translator::io::excel_read;
use crate::crm::translator::model::LanguageCode;

/// Directory, next to the source file, that receives matching exports.
pub const MATCHING_EXPORT_DIR: &str = "MatchingExport";

/// Selects which field kinds and metadata categories an export covers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub export_names: bool,
    pub export_descriptions: bool,
    pub export_booleans: bool,
    pub export_attributes: bool,
    pub export_entities: bool,
    pub export_forms: bool,
    pub export_form_tabs: bool,
    pub export_form_sections: bool,
    pub export_form_fields: bool,
    pub export_views: bool,
    pub export_option_sets: bool,
    pub export_global_option_sets: bool,
    pub export_customized_relationships: bool,
    pub export_dashboards: bool,
    pub export_site_map: bool,
    pub export_charts: bool,
    /// Entity logical names to export; empty means every entity.
    pub entities: Vec<String>,
    pub file_path: PathBuf,
}

impl ExportSettings {
    /// Names and descriptions of entities and attributes, written to `file_path`.
    pub fn labels(file_path: impl Into<PathBuf>) -> Self {
        Self {
            export_names: true,
            export_descriptions: true,
            export_attributes: true,
            export_entities: true,
            file_path: file_path.into(),
            ..Self::default()
        }
    }

    /// Reads a previous export and enables the switches whose sheets exist.
    pub fn detect(source: &Path) -> Result<Self> {
        let workbook = excel_read::read_workbook(source)?;
        let settings = Self::from_workbook(source, &workbook);
        info!(
            file = %settings.file_path.display(),
            entities = %settings.entities.join(","),
            "export settings detected"
        );
        Ok(settings)
    }

    /// Builds settings from the sheets of `workbook`, read from `source`.
    pub fn from_workbook(source: &Path, workbook: &WorkbookData) -> Self {
        let names: Vec<&str> = workbook
            .tables
            .iter()
            .map(|table| table.sheet_name.as_str())
            .collect();
        let is = |expected: &str| names.iter().any(|name| name.eq_ignore_ascii_case(expected));
        let starts = |prefix: &str| {
            names.iter().any(|name| {
                name.len() >= prefix.len()
                    && name.is_char_boundary(prefix.len())
                    && name[..prefix.len()].eq_ignore_ascii_case(prefix)
            })
        };

        let directory = source.parent().unwrap_or_else(|| Path::new(""));
        let file_name = source.file_name().unwrap_or_default();

        Self {
            export_names: true,
            export_descriptions: true,
            export_attributes: is("Attributes"),
            export_booleans: is("Booleans"),
            export_charts: is("Charts"),
            export_customized_relationships: starts("Relationships"),
            export_dashboards: starts("Dashboards "),
            export_entities: is(ENTITIES_SHEET),
            export_form_fields: is("Forms Fields"),
            export_forms: is("Forms"),
            export_form_sections: is("Forms Sections"),
            export_form_tabs: is("Forms Tabs"),
            export_global_option_sets: is("Global OptionSets"),
            export_option_sets: is("OptionSets"),
            export_site_map: starts("SiteMap "),
            export_views: is("Views"),
            entities: workbook
                .table(ENTITIES_SHEET)
                .map(entities_in_sheet)
                .unwrap_or_default(),
            file_path: directory.join(MATCHING_EXPORT_DIR).join(file_name),
        }
    }

    /// Categories that are switched on but have no translator here.
    pub fn unsupported_categories(&self) -> Vec<&'static str> {
        [
            (self.export_booleans, "booleans"),
            (self.export_forms, "forms"),
            (self.export_form_tabs, "form tabs"),
            (self.export_form_sections, "form sections"),
            (self.export_form_fields, "form fields"),
            (self.export_views, "views"),
            (self.export_option_sets, "option sets"),
            (self.export_global_option_sets, "global option sets"),
            (self.export_customized_relationships, "relationships"),
            (self.export_dashboards, "dashboards"),
            (self.export_site_map, "site map"),
            (self.export_charts, "charts"),
        ]
        .into_iter()
        .filter_map(|(enabled, name)| enabled.then_some(name))
        .collect()
    }
}

fn entities_in_sheet(table: &SheetTable) -> Vec<String> {
    let mut entities: Vec<String> = Vec::new();
    for row in &table.rows {
        let name = row.get(1).map(|cell| cell.trim()).unwrap_or_default();
        if !name.is_empty() && !entities.iter().any(|known| known == name) {
            entities.push(name.to_string());
        }
    }
    entities
}

/// Policy applied when merging an imported workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Let blank cells erase the stored label for their language.
    pub allow_blank: bool,
    /// Only apply this language column when set.
    pub language: Option<LanguageCode>,
    pub entity_batch_size: NonZeroUsize,
    pub attribute_batch_size: NonZeroUsize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            allow_blank: false,
            language: None,
            entity_batch_size: ENTITY_BATCH_SIZE,
            attribute_batch_size: ATTRIBUTE_BATCH_SIZE,
        }
    }
}

impl ImportOptions {
    /// Whether the column for `code` takes part in the import.
    pub fn applies_to(&self, code: LanguageCode) -> bool {
        self.language.is_none_or(|only| only == code)
    }
}
