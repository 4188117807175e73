use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, TranslatorError>;

/// Error type covering the different failure cases that can occur when the
/// tool reads workbooks, talks to the metadata store, or writes exports.
#[derive(Debug, Error)]
pub enum TranslatorError {
    /// Wrapper for IO failures such as reading, writing, or moving files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a sheet does not follow the expected conventions.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when a row carries a field-kind tag outside the closed set.
    #[error("row {row}: unknown field kind '{value}'")]
    UnknownFieldKind { row: usize, value: String },

    /// Raised when a language column header is not a positive locale code.
    #[error("invalid language code '{0}'")]
    InvalidLanguageCode(String),

    /// Raised when a row carries an identifier that is not a GUID.
    #[error("row {row}: invalid identifier '{value}'")]
    InvalidIdentifier { row: usize, value: String },

    /// Raised when the metadata store rejects or fails a call as a whole.
    #[error("metadata store error: {0}")]
    Store(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when a named connection is absent from the configuration.
    #[error("connection '{0}' is not available in config")]
    UnknownConnection(String),

    /// Raised when the configuration file is inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl TranslatorError {
    /// Flattens the error and every source beneath it into one message.
    ///
    /// Wrapped errors already render their direct source, so a source whose
    /// text is a suffix of the message so far is not repeated.
    pub fn chain_message(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(inner) = source {
            let text = inner.to_string();
            if !message.ends_with(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = inner.source();
        }
        message
    }
}
