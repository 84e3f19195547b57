//! Runtime settings of an extraction session.

use std::time::Duration;

use crate::engine::ParameterExtractor;
use crate::export::ExportFormat;

/// Period between two progress reports while an extraction runs.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub progress_interval: Duration,
    /// Remove `:1234` / `#1234` id suffixes from element names.
    pub strip_name_ids: bool,
    pub export_format: ExportFormat,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            strip_name_ids: true,
            export_format: ExportFormat::Xlsx,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn extractor(&self) -> ParameterExtractor {
        ParameterExtractor::default().with_name_id_stripping(self.strip_name_ids)
    }
}
