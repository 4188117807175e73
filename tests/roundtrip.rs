mod common;

use std::fs;

use common::{ENGLISH, FRENCH, attribute_text};
use crm_translator::codec::{ATTRIBUTES_SHEET, ENTITIES_SHEET, SheetTable, WorkbookData};
use crm_translator::config::TranslatorConfig;
use crm_translator::engine;
use crm_translator::io::{excel_read, excel_write};
use crm_translator::outcome::OutcomeStatus;
use crm_translator::settings::{ExportSettings, ImportOptions};
use crm_translator::store::InMemoryStore;
use crm_translator::sync::{self, Mode};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[test]
fn export_then_import_without_edits_changes_nothing() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("labels.xlsx");
    let mut store = common::store();
    let before = store.catalog().clone();

    engine::export_to_file(&ExportSettings::labels(&xlsx_path), &store).expect("Excel written");
    let outcomes = engine::import_file(&xlsx_path, &mut store, &ImportOptions::default())
        .expect("Excel imported");

    assert!(
        outcomes
            .iter()
            .all(|outcome| outcome.status == OutcomeStatus::Skipped),
        "unexpected outcomes: {outcomes:?}"
    );
    assert!(store.submissions().is_empty());
    assert_eq!(store.catalog(), &before);
}

#[test]
fn workbook_cells_survive_the_file_format() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("labels.xlsx");
    let store = common::store();

    let workbook = engine::export(&ExportSettings::labels(&xlsx_path), &store).expect("export");
    excel_write::write_workbook(&xlsx_path, &workbook).expect("Excel written");
    let restored = excel_read::read_workbook(&xlsx_path).expect("Excel read");

    assert_eq!(restored.tables.len(), 2);
    for (written, read) in workbook.tables.iter().zip(&restored.tables) {
        assert_eq!(written.sheet_name, read.sheet_name);
        assert_eq!(written.columns, read.columns);
        for (written_row, read_row) in written.rows.iter().zip(&read.rows) {
            let padded: Vec<String> = (0..written_row.len())
                .map(|index| read_row.get(index).cloned().unwrap_or_default())
                .collect();
            assert_eq!(written_row, &padded);
        }
    }
}

#[test]
fn edited_export_is_applied_on_import() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("labels.xlsx");
    let mut store = common::store();

    let mut workbook = engine::export(&ExportSettings::labels(&xlsx_path), &store).expect("export");
    let attributes = workbook
        .tables
        .iter_mut()
        .find(|table| table.sheet_name == ATTRIBUTES_SHEET)
        .expect("attributes sheet");
    for row in &mut attributes.rows {
        if row[1] == "contact" && row[2] == "fullname" && row[3] == "DisplayName" {
            row[5] = "Nom complet".to_string();
        }
    }
    excel_write::write_workbook(&xlsx_path, &workbook).expect("Excel written");

    let outcomes = engine::import_file(&xlsx_path, &mut store, &ImportOptions::default())
        .expect("Excel imported");

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, OutcomeStatus::Success);
    assert_eq!(outcomes[0].sheet, ATTRIBUTES_SHEET);
    assert_eq!(
        attribute_text(&store, "contact", "fullname", FRENCH),
        Some("Nom complet".to_string())
    );
    assert_eq!(
        attribute_text(&store, "contact", "fullname", ENGLISH),
        Some("Full Name".to_string())
    );
}

#[test]
fn settings_are_detected_from_a_previous_export() {
    let source = std::path::Path::new("drop").join("translated.xlsx");
    let table = |name: &str, rows: Vec<Vec<String>>| SheetTable {
        sheet_name: name.to_string(),
        columns: vec![],
        rows,
    };
    let row = |entity: &str| vec![String::new(), entity.to_string()];
    let workbook = WorkbookData {
        tables: vec![
            table(
                "entities",
                vec![row("contact"), row("account"), row("contact"), row("")],
            ),
            table("Relationships (1-N)", vec![]),
            table("SiteMap Default", vec![]),
            table("Forms Tabs", vec![]),
        ],
    };

    let settings = ExportSettings::from_workbook(&source, &workbook);

    assert!(settings.export_names && settings.export_descriptions);
    assert!(settings.export_entities);
    assert!(!settings.export_attributes);
    assert!(settings.export_customized_relationships);
    assert!(settings.export_site_map);
    assert!(settings.export_form_tabs);
    assert!(!settings.export_forms);
    assert!(!settings.export_dashboards);
    assert_eq!(settings.entities, vec!["contact", "account"]);
    assert_eq!(
        settings.file_path,
        std::path::Path::new("drop")
            .join("MatchingExport")
            .join("translated.xlsx")
    );
}

#[test]
fn directory_run_isolates_failures_and_archives_workbooks() {
    let temp_dir = tempdir().expect("temporary directory");
    let drop_dir = temp_dir.path().join("drop");
    fs::create_dir_all(&drop_dir).unwrap();
    let mut store = common::store();

    let mut workbook = engine::export(&ExportSettings::labels("unused.xlsx"), &store).unwrap();
    let entities = workbook
        .tables
        .iter_mut()
        .find(|table| table.sheet_name == ENTITIES_SHEET)
        .unwrap();
    for row in &mut entities.rows {
        if row[1] == "contact" && row[2] == "DisplayName" {
            row[4] = "Contact (fr)".to_string();
        }
    }
    excel_write::write_workbook(&drop_dir.join("b_labels.xlsx"), &workbook).unwrap();
    fs::write(drop_dir.join("a_broken.xlsx"), b"not a workbook").unwrap();
    fs::write(drop_dir.join("notes.txt"), b"left alone").unwrap();

    let summary =
        sync::process_directory(&drop_dir, &mut store, Mode::Import, &ImportOptions::default())
            .expect("run completes");

    assert_eq!(summary.files, 3);
    assert_eq!(summary.failed_files, 2);
    assert_eq!(summary.archived.len(), 2);
    assert!(drop_dir.join("notes.txt").exists());
    assert!(!drop_dir.join("b_labels.xlsx").exists());
    assert!(summary.archived.iter().all(|path| path.exists()));
    assert_eq!(
        common::entity_text(&store, "contact", |e| e.display_name.as_ref(), FRENCH),
        Some("Contact (fr)".to_string())
    );
}

#[test]
fn export_run_writes_matching_exports() {
    let temp_dir = tempdir().expect("temporary directory");
    let drop_dir = temp_dir.path().join("drop");
    fs::create_dir_all(&drop_dir).unwrap();
    let mut store = common::store();

    let mut settings = ExportSettings::labels("unused.xlsx");
    settings.entities = vec!["contact".into()];
    let previous = engine::export(&settings, &store).unwrap();
    let previous = WorkbookData {
        tables: previous
            .tables
            .into_iter()
            .filter(|table| table.sheet_name == ENTITIES_SHEET)
            .collect(),
    };
    excel_write::write_workbook(&drop_dir.join("contact.xlsx"), &previous).unwrap();

    sync::process_directory(&drop_dir, &mut store, Mode::Export, &ImportOptions::default())
        .expect("run completes");

    let exported = excel_read::read_workbook(&drop_dir.join("MatchingExport").join("contact.xlsx"))
        .expect("matching export written");
    let names: Vec<&str> = exported
        .tables
        .iter()
        .map(|table| table.sheet_name.as_str())
        .collect();
    assert_eq!(names, vec![ENTITIES_SHEET]);
    assert!(exported.tables[0].rows.iter().all(|row| row[1] == "contact"));
}

#[test]
fn config_resolves_named_connections_and_catalog_paths() {
    let temp_dir = tempdir().expect("temporary directory");
    let config_path = temp_dir.path().join("translator.json");
    fs::write(
        &config_path,
        r#"{
            "default_connection": "dev",
            "connections": {
                "dev": { "catalog": "dev-catalog.json" },
                "Prod": { "catalog": "/srv/prod-catalog.json" }
            },
            "attribute_batch_size": 10
        }"#,
    )
    .unwrap();

    let config = TranslatorConfig::load(&config_path).expect("config loads");

    let (name, dev) = config.connection(None).unwrap();
    assert_eq!(name, "dev");
    assert_eq!(dev.catalog, temp_dir.path().join("dev-catalog.json"));
    assert_eq!(config.connection(Some("prod")).unwrap().0, "Prod");
    assert!(config.connection(Some("staging")).is_err());
    assert_eq!(config.attribute_batch_size.get(), 10);
    assert_eq!(config.entity_batch_size.get(), 1);

    let original = common::store();
    original.save(&dev.catalog).unwrap();
    let reloaded = InMemoryStore::load(&dev.catalog).unwrap();
    assert_eq!(reloaded.catalog(), original.catalog());
}
