use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use crm_translator::config::TranslatorConfig;
use crm_translator::model::LanguageCode;
use crm_translator::settings::ImportOptions;
use crm_translator::store::{InMemoryStore, MetadataStore};
use crm_translator::sync::{self, Mode};
use crm_translator::{Result, TranslatorError};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = match init_logging(&cli.log_dir) {
        Ok(guard) => guard,
        Err(error) => {
            eprintln!("error: {error}");
            return ExitCode::FAILURE;
        }
    };

    let mode = cli.mode();
    info!("----------------------------------------------");
    info!("Running the translation {} in batch mode", mode_name(mode));
    info!("----------------------------------------------");

    let status = match run(&cli, mode) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            error!(error = %failure.chain_message(), "run aborted");
            ExitCode::FAILURE
        }
    };

    info!("Translation {} complete", mode_name(mode));
    status
}

fn run(cli: &Cli, mode: Mode) -> Result<()> {
    let config = TranslatorConfig::load(&cli.config)?;
    let (connection_name, connection) = config.connection(cli.connection.as_deref())?;
    let catalog_path = connection.catalog.clone();

    if !cli.directory.is_dir() {
        return Err(TranslatorError::MissingInput(cli.directory.clone()));
    }
    info!(directory = %cli.directory.display(), "processing directory");

    let mut store = InMemoryStore::load(&catalog_path)?;
    let user = store.who_am_i()?;
    info!(connection = connection_name, %user, "store is reachable");

    let options = ImportOptions {
        allow_blank: cli.allow_blank,
        language: cli.language.map(LanguageCode::new).transpose()?,
        entity_batch_size: config.entity_batch_size,
        attribute_batch_size: config.attribute_batch_size,
    };
    if let Some(language) = options.language {
        info!(%language, "restricting import to one language");
    }

    let summary = sync::process_directory(&cli.directory, &mut store, mode, &options)?;
    let failures = summary
        .outcomes
        .iter()
        .filter(|outcome| outcome.is_failure())
        .count();
    info!(
        files = summary.files,
        failed_files = summary.failed_files,
        archived = summary.archived.len(),
        outcomes = summary.outcomes.len(),
        failures,
        "run summary"
    );

    if mode == Mode::Import {
        store.save(&catalog_path)?;
    }
    Ok(())
}

fn init_logging(log_dir: &Path) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir)?;
    let file_name = format!("ImportTranslations_{}.log", Local::now().format("%m%d%Y"));
    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stdout)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|error| TranslatorError::Logging(error.to_string()))?;
    Ok(guard)
}

fn mode_name(mode: Mode) -> &'static str {
    match mode {
        Mode::Import => "import",
        Mode::Export => "export",
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Synchronise catalog display labels with Excel workbooks."
)]
struct Cli {
    /// Directory holding the workbooks to process.
    directory: PathBuf,

    /// Named connection from the configuration file.
    connection: Option<String>,

    /// `E` exports matching workbooks instead of importing.
    mode: Option<String>,

    /// Configuration file listing the available connections.
    #[arg(long, default_value = "translator.json")]
    config: PathBuf,

    /// Let empty cells erase the stored label for their language.
    #[arg(long)]
    allow_blank: bool,

    /// Only import this language column (locale identifier, e.g. 1036).
    #[arg(long)]
    language: Option<u32>,

    /// Directory receiving the dated log files.
    #[arg(long, default_value = "Logs")]
    log_dir: PathBuf,
}

impl Cli {
    fn mode(&self) -> Mode {
        match &self.mode {
            Some(flag) if flag.eq_ignore_ascii_case("E") => Mode::Export,
            _ => Mode::Import,
        }
    }
}
