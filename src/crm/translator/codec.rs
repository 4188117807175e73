//! Fixed-layout rows of the `Entities` and `Attributes` sheets.
//!
//! Entity rows are `Entity Id | Entity Logical Name | Type | <lcid>...` and
//! attribute rows insert an `Attribute Logical Name` column before `Type`.
//! The header row names one locale identifier per language column.

use uuid::Uuid;

use crate::crm::translator::error::{Result, TranslatorError};
use crate::crm::translator::model::{FieldKind, LanguageCode};

/// Sheet name carrying entity labels.
pub const ENTITIES_SHEET: &str = "Entities";
/// Sheet name carrying attribute labels.
pub const ATTRIBUTES_SHEET: &str = "Attributes";

/// A table that will be materialised as an Excel sheet, or was read from one.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// All tables of one workbook, in sheet order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkbookData {
    pub tables: Vec<SheetTable>,
}

impl WorkbookData {
    /// Finds a table by name, ignoring ASCII case.
    pub fn table(&self, name: &str) -> Option<&SheetTable> {
        self.tables
            .iter()
            .find(|table| table.sheet_name.eq_ignore_ascii_case(name))
    }
}

/// Column layout of a translation sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLayout {
    Entity,
    Attribute,
}

impl RowLayout {
    fn key_headers(self) -> &'static [&'static str] {
        match self {
            RowLayout::Entity => &["Entity Id", "Entity Logical Name", "Type"],
            RowLayout::Attribute => &[
                "Attribute Id",
                "Entity Logical Name",
                "Attribute Logical Name",
                "Type",
            ],
        }
    }

    /// Index of the first language column.
    pub fn language_offset(self) -> usize {
        self.key_headers().len()
    }

    fn type_column(self) -> usize {
        self.language_offset() - 1
    }
}

/// One exported or imported translation record.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRow {
    /// Zero-based row index within the sheet; the header is row 0.
    pub row: usize,
    pub owner_id: Option<Uuid>,
    pub entity: String,
    pub attribute: Option<String>,
    pub kind: FieldKind,
    /// One cell per language column, in header order.
    pub cells: Vec<String>,
}

impl TranslationRow {
    /// Pairs each cell with the language of its column. Cells missing at the
    /// end of a short row read as empty.
    pub fn language_cells<'a>(
        &'a self,
        languages: &'a [LanguageCode],
    ) -> impl Iterator<Item = (LanguageCode, &'a str)> + 'a {
        languages.iter().enumerate().map(|(index, code)| {
            let cell = self.cells.get(index).map(String::as_str).unwrap_or("");
            (*code, cell)
        })
    }
}

/// A decoded sheet. Rows that violate the layout are kept as errors so the
/// caller can report them without aborting the sheet.
#[derive(Debug)]
pub struct DecodedSheet {
    pub languages: Vec<LanguageCode>,
    pub rows: Vec<Result<TranslationRow>>,
}

/// Builds the header row for `layout` and the given languages.
pub fn header(layout: RowLayout, languages: &[LanguageCode]) -> Vec<String> {
    layout
        .key_headers()
        .iter()
        .map(|header| header.to_string())
        .chain(languages.iter().map(LanguageCode::to_string))
        .collect()
}

/// Converts a record into its cells.
pub fn encode_row(layout: RowLayout, row: &TranslationRow) -> Vec<String> {
    let mut cells = Vec::with_capacity(layout.language_offset() + row.cells.len());
    cells.push(row.owner_id.map(format_id).unwrap_or_default());
    cells.push(row.entity.clone());
    if layout == RowLayout::Attribute {
        cells.push(row.attribute.clone().unwrap_or_default());
    }
    cells.push(row.kind.tag().to_string());
    cells.extend(row.cells.iter().cloned());
    cells
}

/// Formats an identifier the way exports carry it: braced, lower case.
pub fn format_id(id: Uuid) -> String {
    id.braced().to_string()
}

/// Parses the header and every data row of `table`.
///
/// Fails as a whole only when the header is malformed. Rows with a blank
/// owner logical name are ignored.
pub fn decode_sheet(layout: RowLayout, table: &SheetTable) -> Result<DecodedSheet> {
    let offset = layout.language_offset();
    if table.columns.len() < offset {
        return Err(TranslatorError::InvalidWorkbook(format!(
            "sheet '{}' has {} columns, expected at least {offset}",
            table.sheet_name,
            table.columns.len()
        )));
    }

    let mut language_headers = &table.columns[offset..];
    while let Some((last, rest)) = language_headers.split_last() {
        if !last.trim().is_empty() {
            break;
        }
        language_headers = rest;
    }
    let languages = language_headers
        .iter()
        .map(|header| header.parse::<LanguageCode>())
        .collect::<Result<Vec<_>>>()
        .map_err(|error| {
            TranslatorError::InvalidWorkbook(format!(
                "sheet '{}': {error}",
                table.sheet_name
            ))
        })?;

    let rows = table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, cells)| !cell(cells, 1).trim().is_empty())
        .map(|(index, cells)| decode_row(layout, index + 1, cells, languages.len()))
        .collect();

    Ok(DecodedSheet { languages, rows })
}

fn decode_row(
    layout: RowLayout,
    row: usize,
    cells: &[String],
    language_count: usize,
) -> Result<TranslationRow> {
    let raw_id = cell(cells, 0).trim();
    let owner_id = if raw_id.is_empty() {
        None
    } else {
        Some(
            Uuid::parse_str(raw_id).map_err(|_| TranslatorError::InvalidIdentifier {
                row,
                value: raw_id.to_string(),
            })?,
        )
    };

    let attribute = match layout {
        RowLayout::Entity => None,
        RowLayout::Attribute => {
            let name = cell(cells, 2).trim();
            if name.is_empty() {
                return Err(TranslatorError::InvalidWorkbook(format!(
                    "row {row}: missing attribute logical name"
                )));
            }
            Some(name.to_string())
        }
    };

    let tag = cell(cells, layout.type_column()).trim();
    let kind = FieldKind::from_tag(tag).ok_or_else(|| TranslatorError::UnknownFieldKind {
        row,
        value: tag.to_string(),
    })?;

    let offset = layout.language_offset();
    let language_cells = (0..language_count)
        .map(|index| cell(cells, offset + index).to_string())
        .collect();

    Ok(TranslationRow {
        row,
        owner_id,
        entity: cell(cells, 1).trim().to_string(),
        attribute,
        kind,
        cells: language_cells,
    })
}

fn cell(cells: &[String], index: usize) -> &str {
    cells.get(index).map(String::as_str).unwrap_or("")
}
