//! # IFC Params
//!
//! Tabulates one property set across every element of an IFC category and
//! exports the result to a spreadsheet.
//!
//! ## Features
//!
//! - Parse IFC files (IFC2x3 and IFC4 schemas)
//! - Extract a property set per category with a fallback lookup chain
//! - Error rows instead of aborted extractions when single elements fault
//! - Background extraction with periodic progress reporting
//! - Export to XLSX (styled table), CSV and JSON
//!
//! ## Example
//!
//! ```no_run
//! use ifc_params::engine::extract_parameters;
//! use ifc_params::export::{export_table, ExportFormat};
//! use ifc_params::parser::load_ifc_file;
//! use std::path::Path;
//!
//! let model = load_ifc_file("building.ifc").expect("Failed to parse");
//! let table = extract_parameters(&model, "IfcWall", "Pset_WallCommon").expect("Failed to extract");
//! println!("{} walls, {} parameters", table.rows.len(), table.parameter_names.len());
//!
//! let report = export_table(&table, Path::new("building.ifc"), "IfcWall", "Pset_WallCommon", ExportFormat::Xlsx)
//!     .expect("Failed to export");
//! println!("Written to {}", report.path.display());
//! ```

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod model;
pub mod parser;
pub mod query;
pub mod session;
