//! Error types used by the scheduler and by task handlers.
//!
//! - [`SchedulerError`]: local, non-fatal conditions raised by [`Scheduler`](crate::Scheduler)
//!   operations (closed scheduler, unknown task id).
//! - [`HandlerError`]: the opaque error a user handler may return; passed
//!   through to the execution callback unchanged.
//! - [`HandlerPanic`]: the [`HandlerError`] reported when a handler panics.
//!
//! Task outcomes are **not** errors: they are reported as a [`Cause`](crate::Cause)
//! alongside the execution callback.

use thiserror::Error;

/// Opaque error returned by a task handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result returned by a task handler.
pub type HandlerResult<T> = Result<T, HandlerError>;

/// # Errors produced by scheduler operations.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// The scheduler was stopped; no new tasks are accepted.
    #[error("scheduler is closed")]
    Closed,

    /// No registered task has this id (never added, already finished, or deleted).
    #[error("task not found: {id}")]
    TaskNotFound {
        /// The id that was looked up.
        id: String,
    },
}

impl SchedulerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use delayvisor::SchedulerError;
    ///
    /// let err = SchedulerError::TaskNotFound { id: "42".into() };
    /// assert_eq!(err.as_label(), "scheduler_task_not_found");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SchedulerError::Closed => "scheduler_closed",
            SchedulerError::TaskNotFound { .. } => "scheduler_task_not_found",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SchedulerError::Closed => "scheduler closed".to_string(),
            SchedulerError::TaskNotFound { id } => format!("task not found: id={id}"),
        }
    }
}

/// A task handler panicked instead of returning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("handler panicked: {message}")]
pub struct HandlerPanic {
    /// Panic payload, when it was a string.
    pub message: String,
}

impl HandlerPanic {
    pub(crate) fn from_payload(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        Self { message }
    }
}
