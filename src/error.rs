//! Error types for IFC Params.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when parsing IFC files.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Failed to read the IFC file from disk.
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The STEP format is invalid or malformed.
    #[error("invalid STEP format: {message}")]
    InvalidStep { message: String },
}

/// Faults raised by a model query.
///
/// `Unsupported` is not a fault of the model: it tells the caller that a lookup
/// strategy is not offered by this implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The category is not a usable entity type name.
    #[error("invalid category '{category}'")]
    InvalidCategory { category: String },

    /// The entity handle does not resolve to an entity in the model.
    #[error("unknown entity #{id}")]
    UnknownEntity { id: u64 },

    /// An attribute references an entity that does not exist.
    #[error("entity #{from} references missing entity #{to}")]
    DanglingReference { from: u64, to: u64 },

    /// An entity carries data of an unexpected shape.
    #[error("malformed entity #{id}: {message}")]
    Malformed { id: u64, message: String },

    /// The lookup is not implemented by this model.
    #[error("lookup not supported: {lookup}")]
    Unsupported { lookup: &'static str },
}

/// Errors that abort a whole extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Listing the entities of the category failed.
    #[error("failed to list entities of '{category}': {source}")]
    Listing {
        category: String,
        source: QueryError,
    },

    /// The extraction was cancelled before it completed.
    #[error("extraction of '{category}' / '{pset}' was cancelled")]
    Cancelled { category: String, pset: String },

    /// The background task running the extraction died.
    #[error("extraction task failed: {message}")]
    TaskFailed { message: String },
}

/// Errors that can occur when exporting data.
#[derive(Debug, Error)]
pub enum ExportError {
    /// There is no extracted table to export.
    #[error("No data to export")]
    NoData,

    /// The source model path has no usable file name.
    #[error("cannot derive export name from '{path}'")]
    InvalidSourcePath { path: PathBuf },

    /// The table does not fit in a worksheet.
    #[error("table of {rows} rows x {columns} columns exceeds worksheet limits")]
    TooLarge { rows: usize, columns: usize },

    /// Failed to create the output file.
    #[error("failed to create file '{path}': {source}")]
    FileCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write data to the file.
    #[error("failed to write data: {message}")]
    WriteError { message: String },

    /// Failed to build or save the workbook.
    #[error("XLSX write failed: {source}")]
    Xlsx {
        #[from]
        source: rust_xlsxwriter::XlsxError,
    },

    /// Failed to serialize data to JSON.
    #[error("JSON serialization failed: {source}")]
    JsonSerialize {
        #[from]
        source: serde_json::Error,
    },

    /// Failed to write CSV data.
    #[error("CSV write failed: {source}")]
    CsvWrite {
        #[from]
        source: csv::Error,
    },
}
