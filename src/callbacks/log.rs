//! # LogWriter: callback that logs through `tracing`
//!
//! A minimal [`Callback`] that emits one `tracing` event per notification.
//! Use it for debugging or demos; install a `tracing` subscriber to see output.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO delayvisor: task added id="5f0c…" name="report" in_ms=200
//! INFO delayvisor: task executed id="5f0c…" name="report" cause="task_timeout" outcome="ok"
//! INFO delayvisor: task removed id="5f0c…" name="report"
//! WARN delayvisor: task duplicated id="5f0c…" name="report"
//! ```

use std::fmt;

use tokio::time::Instant;

use crate::callbacks::Callback;
use crate::error::HandlerResult;
use crate::tasks::Cause;

/// Lifecycle logger.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl<T: fmt::Debug> Callback<T> for LogWriter {
    fn on_task_added(&self, id: &str, name: &str, exec_at: Instant) {
        let in_ms = exec_at.saturating_duration_since(Instant::now()).as_millis() as u64;
        tracing::info!(target: "delayvisor", id, name, in_ms, "task added");
    }

    fn on_task_executed(&self, id: &str, name: &str, cause: Cause, outcome: Option<HandlerResult<T>>) {
        match outcome {
            None => {
                tracing::info!(target: "delayvisor", id, name, cause = cause.as_label(), "task executed");
            }
            Some(Ok(value)) => {
                tracing::info!(target: "delayvisor", id, name, cause = cause.as_label(), outcome = "ok", result = ?value, "task executed");
            }
            Some(Err(err)) => {
                tracing::info!(target: "delayvisor", id, name, cause = cause.as_label(), outcome = "err", error = %err, "task executed");
            }
        }
    }

    fn on_task_removed(&self, id: &str, name: &str) {
        tracing::info!(target: "delayvisor", id, name, "task removed");
    }

    fn on_task_duplicated(&self, id: &str, name: &str) {
        tracing::warn!(target: "delayvisor", id, name, "task duplicated");
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
