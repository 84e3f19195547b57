pub mod csv;
pub mod json;
pub mod xlsx;

pub use crate::error::ExportError;
pub use csv::export_csv;
pub use json::export_json;
pub use xlsx::export_xlsx;

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::model::ParameterTable;

/// File format of an exported parameter table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
    Json,
}

impl ExportFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// What an export wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
    /// A1-style range covered by header and data, e.g. `A1:H3`.
    pub range: String,
}

/// Writes `table` next to the source model, overwriting any previous export.
///
/// The file is `<model dir>/<model stem>_<category>_<pset>.<ext>`.
pub fn export_table(
    table: &ParameterTable,
    source_model: &Path,
    category: &str,
    pset: &str,
    format: ExportFormat,
) -> Result<ExportReport, ExportError> {
    if table.is_empty() {
        return Err(ExportError::NoData);
    }

    let path = export_file_path(source_model, category, pset, format)?;
    match format {
        ExportFormat::Xlsx => export_xlsx(table, &path)?,
        ExportFormat::Csv => export_csv(table, &path)?,
        ExportFormat::Json => export_json(table, &path)?,
    }

    let report = ExportReport {
        rows: table.rows.len(),
        columns: table.width(),
        range: table_range(table.width(), table.rows.len()),
        path,
    };
    tracing::info!(
        path = %report.path.display(),
        rows = report.rows,
        columns = report.columns,
        range = %report.range,
        "exported parameter table"
    );
    Ok(report)
}

/// Deterministic export location derived from the source model and the selection.
pub fn export_file_path(
    source_model: &Path,
    category: &str,
    pset: &str,
    format: ExportFormat,
) -> Result<PathBuf, ExportError> {
    let stem = source_model
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ExportError::InvalidSourcePath {
            path: source_model.to_path_buf(),
        })?;

    let file_name = format!(
        "{stem}_{}_{}.{}",
        sanitize(category),
        sanitize(pset),
        format.extension()
    );
    let folder = source_model.parent().unwrap_or_else(|| Path::new(""));
    Ok(folder.join(file_name))
}

/// Replaces characters that would split or escape the file name.
#[must_use]
pub fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| if matches!(c, ' ' | '/' | '\\') { '_' } else { c })
        .collect()
}

/// Spreadsheet column label for a 1-based column number: 1 → `A`, 27 → `AA`.
#[must_use]
pub fn column_label(column: usize) -> String {
    let mut n = column.max(1);
    let mut label = Vec::new();
    while n > 0 {
        n -= 1;
        label.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    label.reverse();
    String::from_utf8(label).unwrap_or_default()
}

/// A1 range of a header row plus `rows` data rows over `columns` columns.
#[must_use]
pub fn table_range(columns: usize, rows: usize) -> String {
    format!("A1:{}{}", column_label(columns), rows + 1)
}
