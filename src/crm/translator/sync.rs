use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{error, info, instrument, warn};

use crate::crm::translator::engine;
use crate::crm::translator::error::{Result, TranslatorError};
use crate::crm::translator::outcome::{Outcome, OutcomeStatus};
use crate::crm::translator::settings::{ExportSettings, ImportOptions};
use crate::crm::translator::store::MetadataStore;

/// Subdirectory receiving processed workbooks.
pub const PROCESSED_DIR: &str = "Processed";

/// Direction of a directory run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Push the labels of each workbook into the store.
    Import,
    /// Re-export, from the store, the sheets and entities each workbook holds.
    Export,
}

/// What a directory run did.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub files: usize,
    pub failed_files: usize,
    pub archived: Vec<PathBuf>,
    pub outcomes: Vec<Outcome>,
}

/// Processes every file directly inside `directory`, in name order.
///
/// A failing file is logged and counted but does not stop the run. Every
/// `.xlsx` file is then moved into `Processed/<timestamp>`, whether or not
/// it succeeded.
#[instrument(level = "info", skip(directory, store, options), fields(directory = %directory.display()))]
pub fn process_directory<S>(
    directory: &Path,
    store: &mut S,
    mode: Mode,
    options: &ImportOptions,
) -> Result<RunSummary>
where
    S: MetadataStore + ?Sized,
{
    if !directory.is_dir() {
        return Err(TranslatorError::MissingInput(directory.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let destination = directory
        .join(PROCESSED_DIR)
        .join(Local::now().format("%Y%m%d%H%M%S").to_string());

    let mut summary = RunSummary::default();
    for file in files {
        summary.files += 1;
        match process_file(&file, store, mode, options) {
            Ok(outcomes) => {
                outcomes.iter().for_each(log_outcome);
                summary.outcomes.extend(outcomes);
            }
            Err(failure) => {
                summary.failed_files += 1;
                error!(
                    file = %file.display(),
                    error = %failure.chain_message(),
                    "error processing file"
                );
            }
        }

        if !is_workbook(&file) {
            continue;
        }
        match archive(&file, &destination) {
            Ok(archived) => summary.archived.push(archived),
            Err(failure) => error!(
                file = %file.display(),
                error = %failure.chain_message(),
                "error moving file"
            ),
        }
    }

    info!(
        files = summary.files,
        failed = summary.failed_files,
        "directory processed"
    );
    Ok(summary)
}

fn process_file<S>(
    file: &Path,
    store: &mut S,
    mode: Mode,
    options: &ImportOptions,
) -> Result<Vec<Outcome>>
where
    S: MetadataStore + ?Sized,
{
    match mode {
        Mode::Import => {
            info!(file = %file.display(), "importing file");
            engine::import_file(file, store, options)
        }
        Mode::Export => {
            info!(file = %file.display(), "exporting file");
            let settings = ExportSettings::detect(file)?;
            engine::export_to_file(&settings, &*store)?;
            Ok(Vec::new())
        }
    }
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("xlsx"))
}

fn archive(file: &Path, destination: &Path) -> Result<PathBuf> {
    fs::create_dir_all(destination)?;
    let file_name = file
        .file_name()
        .ok_or_else(|| TranslatorError::MissingInput(file.to_path_buf()))?;
    let target = destination.join(file_name);
    fs::rename(file, &target)?;
    Ok(target)
}

fn log_outcome(outcome: &Outcome) {
    match outcome.status {
        OutcomeStatus::Failure => warn!("{outcome}"),
        OutcomeStatus::Success | OutcomeStatus::Skipped => info!("{outcome}"),
    }
}
