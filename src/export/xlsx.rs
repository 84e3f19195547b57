use crate::error::ExportError;
use crate::model::ParameterTable;
use rust_xlsxwriter::{Table, TableColumn, TableStyle, Workbook};
use std::collections::HashSet;
use std::path::Path;

const SHEET_NAME: &str = "IFC Data Export";
const TABLE_NAME: &str = "IFCDataTable";

/// Worksheet limits of the XLSX format.
const MAX_ROWS: usize = 1_048_576;
const MAX_COLUMNS: usize = 16_384;

/// Writes the table to a single-sheet workbook with a banded table over the whole range.
pub fn export_xlsx<P: AsRef<Path>>(table: &ParameterTable, path: P) -> Result<(), ExportError> {
    let headers = unique_headers(&table.header());
    let too_large = || ExportError::TooLarge {
        rows: table.rows.len(),
        columns: headers.len(),
    };
    if table.rows.len() + 1 > MAX_ROWS || headers.len() > MAX_COLUMNS {
        return Err(too_large());
    }
    let last_row = u32::try_from(table.rows.len()).map_err(|_| too_large())?;
    let last_col = u16::try_from(headers.len() - 1).map_err(|_| too_large())?;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(0, col as u16, header)?;
    }

    for (offset, row) in table.rows.iter().enumerate() {
        let excel_row = offset as u32 + 1;
        worksheet.write_number(excel_row, 0, row.index as f64)?;
        for (col, cell) in row.cells().iter().enumerate().skip(1) {
            worksheet.write_string(excel_row, col as u16, cell)?;
        }
    }

    let columns: Vec<TableColumn> = headers
        .iter()
        .map(|header| TableColumn::new().set_header(header))
        .collect();
    let data_table = Table::new()
        .set_name(TABLE_NAME)
        .set_style(TableStyle::Medium9)
        .set_first_column(false)
        .set_last_column(false)
        .set_banded_rows(true)
        .set_banded_columns(false)
        .set_columns(&columns);
    worksheet.add_table(0, 0, last_row, last_col, &data_table)?;

    workbook.save(path.as_ref())?;
    Ok(())
}

/// Spreadsheet tables reject repeated headers (case-insensitively); later
/// repeats get a numeric suffix.
fn unique_headers(headers: &[String]) -> Vec<String> {
    let mut taken = HashSet::new();
    headers
        .iter()
        .map(|header| {
            let mut candidate = header.clone();
            let mut n = 2;
            while !taken.insert(candidate.to_lowercase()) {
                candidate = format!("{header}_{n}");
                n += 1;
            }
            candidate
        })
        .collect()
}
