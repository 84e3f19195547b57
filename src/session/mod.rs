//! Orchestration between a caller (UI or CLI) and the extraction engine.
//!
//! A [`Session`] owns the retained parameter table. Every selection creates an
//! immutable [`ExtractionRequest`] that travels with its result, so a result
//! that arrives after a newer selection is recognised and dropped.

pub mod progress;
pub mod sink;

pub use progress::run_with_progress;
pub use sink::{progress_message, MemorySink, StatusEvent, StatusLevel, StatusSink, TracingSink};

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::catalog;
use crate::config::SessionConfig;
use crate::error::{ExportError, ExtractError};
use crate::export::{export_table, ExportReport};
use crate::model::ParameterTable;
use crate::query::ModelQuery;

/// One (category, pset) selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    /// Increases with every selection; the highest one is current.
    pub generation: u64,
    pub category: String,
    pub pset: String,
}

/// How a selection ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    /// A table with at least one row is now retained.
    Loaded {
        request: Arc<ExtractionRequest>,
        rows: usize,
        parameters: usize,
        elapsed: Duration,
    },
    /// The category has no elements; nothing is retained.
    Empty { request: Arc<ExtractionRequest> },
    /// The extraction faulted; nothing is retained.
    Failed {
        request: Arc<ExtractionRequest>,
        error: String,
    },
    /// A newer selection was made while this one ran; its result was dropped.
    Superseded { request: Arc<ExtractionRequest> },
}

#[derive(Debug, Default)]
struct SessionState {
    latest: u64,
    current: Option<Arc<ExtractionRequest>>,
    table: Option<Arc<ParameterTable>>,
    in_flight: Option<CancellationToken>,
}

/// Entry points the surrounding UI calls: [`select`](Session::select) and
/// [`request_export`](Session::request_export).
#[derive(Clone)]
pub struct Session {
    model: Arc<dyn ModelQuery>,
    sink: Arc<dyn StatusSink>,
    config: SessionConfig,
    state: Arc<Mutex<SessionState>>,
}

impl Session {
    pub fn new(model: Arc<dyn ModelQuery>, sink: Arc<dyn StatusSink>) -> Self {
        Self {
            model,
            sink,
            config: SessionConfig::default(),
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The table of the latest completed selection, if it produced one.
    #[must_use]
    pub fn table(&self) -> Option<Arc<ParameterTable>> {
        self.lock().table.clone()
    }

    /// The latest selection, finished or not.
    #[must_use]
    pub fn current_request(&self) -> Option<Arc<ExtractionRequest>> {
        self.lock().current.clone()
    }

    /// Extracts `pset` for `category` off the async thread, reporting progress
    /// through the sink until it completes.
    ///
    /// The previously retained table is discarded immediately and a still running
    /// extraction is cancelled.
    pub async fn select(&self, category: &str, pset: &str) -> SelectionOutcome {
        let (request, cancel) = self.begin(category, pset);
        tracing::info!(
            generation = request.generation,
            category = %request.category,
            pset = %request.pset,
            "parameters updating"
        );

        let model = Arc::clone(&self.model);
        let extractor = self.config.extractor();
        let work_request = Arc::clone(&request);
        let work = move || {
            extractor.extract_with_cancel(model.as_ref(), &work_request.category, &work_request.pset, &cancel)
        };

        let started = Instant::now();
        let result = run_with_progress(work, self.progress_reporter(&request), self.config.progress_interval).await;
        self.complete(request, result, started.elapsed())
    }

    /// Lists the property sets carried by `category`, reporting progress like [`select`](Session::select).
    pub async fn property_sets(&self, category: &str) -> Result<Vec<String>, ExtractError> {
        let model = Arc::clone(&self.model);
        let owned = category.to_string();
        let sink = Arc::clone(&self.sink);
        let label = category.to_string();

        let started = Instant::now();
        let result = run_with_progress(
            move || catalog::list_property_sets(model.as_ref(), &owned),
            move |elapsed| sink.progress(&label, elapsed),
            self.config.progress_interval,
        )
        .await;
        let secs = started.elapsed().as_secs_f64();

        match &result {
            Ok(psets) if !psets.is_empty() => self.report(
                StatusLevel::Success,
                &format!("Psets from {category} added to the table in {secs:.2} seconds"),
            ),
            Ok(_) => self.report(StatusLevel::Empty, &format!("No Psets found for {category}")),
            Err(error) => self.report(StatusLevel::Failure, &format!("Error: {error}")),
        }
        result
    }

    /// Writes the retained table next to `source_model` in the configured format.
    ///
    /// Fails with [`ExportError::NoData`] (and writes nothing) when no table is retained.
    pub fn request_export(&self, source_model: &Path) -> Result<ExportReport, ExportError> {
        let (table, request) = {
            let state = self.lock();
            (state.table.clone(), state.current.clone())
        };

        let result = match (table, request) {
            (Some(table), Some(request)) => export_table(
                &table,
                source_model,
                &request.category,
                &request.pset,
                self.config.export_format,
            ),
            _ => Err(ExportError::NoData),
        };

        match &result {
            Ok(report) => self.report(
                StatusLevel::Success,
                &format!("Data exported successfully to {}", report.path.display()),
            ),
            Err(error) => self.report(StatusLevel::Failure, &format!("Export failed: {error}")),
        }
        result
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, category: &str, pset: &str) -> (Arc<ExtractionRequest>, CancellationToken) {
        let mut state = self.lock();
        if let Some(previous) = state.in_flight.take() {
            previous.cancel();
        }

        state.latest += 1;
        let request = Arc::new(ExtractionRequest {
            generation: state.latest,
            category: category.to_string(),
            pset: pset.to_string(),
        });
        let cancel = CancellationToken::new();

        state.current = Some(Arc::clone(&request));
        state.table = None;
        state.in_flight = Some(cancel.clone());
        (request, cancel)
    }

    /// Progress callback that goes quiet once the request is no longer current.
    fn progress_reporter(&self, request: &Arc<ExtractionRequest>) -> impl FnMut(Duration) + Send + 'static {
        let state = Arc::clone(&self.state);
        let sink = Arc::clone(&self.sink);
        let request = Arc::clone(request);
        move |elapsed| {
            let current = state.lock().unwrap_or_else(PoisonError::into_inner).latest == request.generation;
            if current {
                sink.progress(&request.category, elapsed);
            }
        }
    }

    fn complete(
        &self,
        request: Arc<ExtractionRequest>,
        result: Result<ParameterTable, ExtractError>,
        elapsed: Duration,
    ) -> SelectionOutcome {
        let category = request.category.clone();
        let pset = request.pset.clone();
        let secs = elapsed.as_secs_f64();

        let outcome = {
            let mut state = self.lock();
            if state.latest != request.generation {
                tracing::debug!(generation = request.generation, %category, %pset, "dropping superseded result");
                return SelectionOutcome::Superseded { request };
            }
            state.in_flight = None;

            match result {
                Ok(table) if !table.is_empty() => {
                    let rows = table.rows.len();
                    let parameters = table.parameter_names.len();
                    state.table = Some(Arc::new(table));
                    SelectionOutcome::Loaded {
                        request,
                        rows,
                        parameters,
                        elapsed,
                    }
                }
                Ok(_) => {
                    state.table = None;
                    SelectionOutcome::Empty { request }
                }
                Err(error) => {
                    state.table = None;
                    SelectionOutcome::Failed {
                        request,
                        error: error.to_string(),
                    }
                }
            }
        };

        match &outcome {
            SelectionOutcome::Loaded { rows, parameters, .. } if *parameters > 0 => {
                tracing::info!(%category, %pset, rows, parameters, "parameters updated");
                self.report(
                    StatusLevel::Success,
                    &format!("Parameters updated for {category} with {pset} in {secs:.2} seconds"),
                );
            }
            SelectionOutcome::Loaded { .. } | SelectionOutcome::Empty { .. } => {
                self.report(StatusLevel::Empty, &format!("No parameters found for {category} with {pset}"));
            }
            SelectionOutcome::Failed { error, .. } => {
                tracing::debug!(%category, %pset, "parameter extraction failed");
                self.report(StatusLevel::Failure, &format!("Error: {error}"));
            }
            SelectionOutcome::Superseded { .. } => {}
        }
        outcome
    }

    /// Failures are logged through the sink only.
    fn report(&self, level: StatusLevel, text: &str) {
        self.sink.status(level, &format!("{} {text}", level.marker()));
    }
}
