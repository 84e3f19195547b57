use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use ifc_params::catalog::list_categories;
use ifc_params::config::SessionConfig;
use ifc_params::export::ExportFormat;
use ifc_params::model::ParameterTable;
use ifc_params::parser::load_ifc_file;
use ifc_params::session::{SelectionOutcome, Session, TracingSink};

#[derive(Parser, Debug)]
#[command(name = "ifc-params")]
#[command(about = "IFC Params - tabulate property sets per category and export them")]
#[command(version)]
struct Args {
    /// Path to IFC file
    #[arg(required = true)]
    file: PathBuf,

    /// Category to extract, e.g. IfcWall (lists categories when omitted)
    #[arg(long, short)]
    category: Option<String>,

    /// Property set to extract (lists the category's property sets when omitted)
    #[arg(long, short)]
    pset: Option<String>,

    /// Write the extracted table next to the IFC file
    #[arg(long)]
    export: bool,

    /// Export file format
    #[arg(long, value_enum, default_value_t = ExportFormat::Xlsx)]
    format: ExportFormat,

    /// Milliseconds between progress updates
    #[arg(long, value_name = "N", default_value_t = 500)]
    interval_ms: u64,

    /// Keep `:1234` / `#1234` id suffixes in element names
    #[arg(long)]
    keep_name_ids: bool,
}

impl Args {
    fn config(&self) -> SessionConfig {
        SessionConfig {
            progress_interval: Duration::from_millis(self.interval_ms),
            strip_name_ids: !self.keep_name_ids,
            export_format: self.format,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let path = args.file.clone();
    let model = tokio::task::spawn_blocking(move || load_ifc_file(path)).await??;

    let info = model.info();
    eprintln!(
        "{} ({:.2} MB, {}, {} products)",
        info.file_name, info.file_size_mb, info.schema, info.product_count
    );

    let Some(category) = args.category.as_deref() else {
        for entry in list_categories(&model)? {
            println!("{:>6}  {}", entry.count, entry.name);
        }
        return Ok(ExitCode::SUCCESS);
    };

    let session = Session::new(Arc::new(model), Arc::new(TracingSink)).with_config(args.config());

    let Some(pset) = args.pset.as_deref() else {
        // Failures are already reported through the sink.
        let Ok(psets) = session.property_sets(category).await else {
            return Ok(ExitCode::FAILURE);
        };
        for name in psets {
            println!("{name}");
        }
        return Ok(ExitCode::SUCCESS);
    };

    match session.select(category, pset).await {
        SelectionOutcome::Loaded { .. } => {
            if let Some(table) = session.table() {
                print_table(&table);
            }
        }
        SelectionOutcome::Failed { .. } => return Ok(ExitCode::FAILURE),
        SelectionOutcome::Empty { .. } | SelectionOutcome::Superseded { .. } => {}
    }

    if args.export && session.request_export(&args.file).is_err() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_table(table: &ParameterTable) {
    println!("{}", table.header().join("\t"));
    for row in &table.rows {
        println!("{}", row.cells().join("\t"));
    }
}
