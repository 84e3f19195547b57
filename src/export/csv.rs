use crate::error::ExportError;
use crate::model::ParameterTable;
use std::fs::File;
use std::path::Path;

/// Header row followed by one record per table row, cells as rendered.
pub fn export_csv<P: AsRef<Path>>(table: &ParameterTable, path: P) -> Result<(), ExportError> {
    let path_ref = path.as_ref();
    let file = File::create(path_ref).map_err(|source| ExportError::FileCreate {
        path: path_ref.to_path_buf(),
        source,
    })?;

    let mut writer = csv::WriterBuilder::new().flexible(false).from_writer(file);
    writer.write_record(table.header())?;
    for record in table.rows.iter().map(|row| row.cells()) {
        writer.write_record(&record)?;
    }

    writer.flush().map_err(|e| ExportError::WriteError {
        message: e.to_string(),
    })
}
