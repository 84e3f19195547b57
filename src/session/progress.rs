//! Runs blocking work off the async thread while reporting elapsed time.

use std::time::Duration;
use tokio::task::JoinError;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::ExtractError;

/// Runs `work` on the blocking pool and calls `on_progress` every `interval`
/// until it completes.
///
/// The first report is immediate. Reports carry strictly increasing elapsed
/// times and none is made once the work has finished. A panic inside `work`
/// becomes [`ExtractError::TaskFailed`].
pub async fn run_with_progress<T, F, P>(work: F, mut on_progress: P, interval: Duration) -> Result<T, ExtractError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ExtractError> + Send + 'static,
    P: FnMut(Duration) + Send,
{
    let started = Instant::now();
    let mut handle = tokio::task::spawn_blocking(work);

    let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_reported: Option<Duration> = None;

    let joined = loop {
        tokio::select! {
            biased;
            joined = &mut handle => break joined,
            _ = ticker.tick() => {
                let elapsed = started.elapsed();
                if last_reported.is_none_or(|last| elapsed > last) {
                    last_reported = Some(elapsed);
                    on_progress(elapsed);
                }
            }
        }
    };

    joined.map_err(task_failure)?
}

fn task_failure(error: JoinError) -> ExtractError {
    let message = if error.is_panic() {
        let payload = error.into_panic();
        payload
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "extraction panicked".to_string())
    } else {
        error.to_string()
    };
    tracing::debug!(%message, "background extraction task failed");
    ExtractError::TaskFailed { message }
}
