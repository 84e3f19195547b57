use crate::error::ExportError;
use crate::model::ParameterTable;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes `{ "parameter_names": [...], "rows": [...] }`; error rows carry a `fault` field.
pub fn export_json<P: AsRef<Path>>(table: &ParameterTable, path: P) -> Result<(), ExportError> {
    let path_ref = path.as_ref();
    let file = File::create(path_ref).map_err(|source| ExportError::FileCreate {
        path: path_ref.to_path_buf(),
        source,
    })?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, table)?;
    writer.flush().map_err(|e| ExportError::WriteError {
        message: e.to_string(),
    })
}
