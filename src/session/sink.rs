//! Outbound notifications of a session: progress ticks and status lines.

use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Success,
    /// Completed, but there was nothing to show.
    Empty,
    Failure,
}

impl StatusLevel {
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            StatusLevel::Success => "[+++]",
            StatusLevel::Empty => "[---]",
            StatusLevel::Failure => "[--]",
        }
    }
}

/// Receives what the session has to tell the user.
pub trait StatusSink: Send + Sync {
    /// Work on `category` is still running after `elapsed`.
    fn progress(&self, category: &str, elapsed: Duration);

    /// A human-readable status line, `message` already prefixed with the level marker.
    fn status(&self, level: StatusLevel, message: &str);
}

/// The line shown while work on `category` runs.
#[must_use]
pub fn progress_message(category: &str, elapsed: Duration) -> String {
    format!(
        "[~~~] Updating parameters for {category}... [{:.1} sec]",
        elapsed.as_secs_f64()
    )
}

/// Forwards everything to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl StatusSink for TracingSink {
    fn progress(&self, category: &str, elapsed: Duration) {
        tracing::info!("{}", progress_message(category, elapsed));
    }

    fn status(&self, level: StatusLevel, message: &str) {
        match level {
            StatusLevel::Failure => tracing::error!("{message}"),
            StatusLevel::Empty => tracing::warn!("{message}"),
            StatusLevel::Success => tracing::info!("{message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    Progress { category: String, elapsed: Duration },
    Status { level: StatusLevel, message: String },
}

/// Collects events for a UI loop (or a test) to drain (thread-safe).
#[derive(Debug, Default)]
pub struct MemorySink {
    pending: Mutex<Vec<StatusEvent>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every event recorded so far.
    pub fn drain(&self) -> Vec<StatusEvent> {
        let mut pending = self.pending.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        std::mem::take(&mut *pending)
    }

    fn push(&self, event: StatusEvent) {
        self.pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(event);
    }
}

impl StatusSink for MemorySink {
    fn progress(&self, category: &str, elapsed: Duration) {
        self.push(StatusEvent::Progress {
            category: category.to_string(),
            elapsed,
        });
    }

    fn status(&self, level: StatusLevel, message: &str) {
        self.push(StatusEvent::Status {
            level,
            message: message.to_string(),
        });
    }
}
