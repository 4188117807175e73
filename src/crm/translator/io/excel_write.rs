use std::fs;
use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};

use crate::crm::translator::codec::WorkbookData;
use crate::crm::translator::error::Result;

/// Writes the provided workbook data to the given path, creating missing
/// parent directories.
pub fn write_workbook(path: &Path, workbook: &WorkbookData) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut workbook_writer = Workbook::new();
    let header_format = Format::new().set_bold();

    for table in &workbook.tables {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&table.sheet_name)?;

        for (col_idx, header) in table.columns.iter().enumerate() {
            worksheet.write_string_with_format(0, col_idx as u16, header, &header_format)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                worksheet.write_string((row_idx + 1) as u32, col_idx as u16, cell)?;
            }
        }

        let col_end = (table.columns.len() as u16).saturating_sub(1);
        let row_end = table.rows.len() as u32;
        worksheet.autofilter(0, 0, row_end, col_end)?;
        worksheet.set_freeze_panes(1, 0)?;
    }

    workbook_writer.save(path)?;
    Ok(())
}
