use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};

use crate::crm::translator::codec::{SheetTable, WorkbookData};
use crate::crm::translator::error::{Result, TranslatorError};

/// Reads every sheet of an Excel workbook as plain string cells. The first
/// row of each sheet becomes the column headers.
pub fn read_workbook(path: &Path) -> Result<WorkbookData> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let mut tables = Vec::new();
    for name in workbook.sheet_names().to_vec() {
        let range = read_required_sheet(&mut workbook, &name)?;
        tables.push(range_to_table(&name, &range));
    }

    Ok(WorkbookData { tables })
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<calamine::Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| TranslatorError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(TranslatorError::from)?;
    Ok(range)
}

fn range_to_table(name: &str, range: &calamine::Range<DataType>) -> SheetTable {
    // Ranges start at the first used cell; pad so column 0 is column A.
    let (leading_rows, leading_columns) = range
        .start()
        .map(|(row, column)| (row as usize, column as usize))
        .unwrap_or_default();

    let mut all_rows: Vec<Vec<String>> = vec![Vec::new(); leading_rows];
    all_rows.extend(range.rows().map(|row| {
        std::iter::repeat_n(String::new(), leading_columns)
            .chain(row.iter().map(|cell| cell_to_string(Some(cell))))
            .collect::<Vec<_>>()
    }));

    let mut all_rows = all_rows.into_iter();
    let columns = all_rows.next().unwrap_or_default();

    SheetTable {
        sheet_name: name.to_string(),
        columns,
        rows: all_rows.collect(),
    }
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
