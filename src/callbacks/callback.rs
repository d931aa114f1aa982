//! # Scheduler callback trait
//!
//! [`Callback`] is the extension point for observing what the scheduler does
//! with tasks. Every method has a no-op default, so implementors override only
//! what they care about.
//!
//! ## Contract
//! - Methods are called synchronously from the thread that caused the event:
//!   the caller of `set`/`delete`/`stop`, or a task's worker. Keep them short.
//! - `on_task_added` fires once the task is registered, so `get(id)` from
//!   inside it finds the task. A deadline already in the past may let the
//!   task's `on_task_executed` run first.
//! - `on_task_executed` fires exactly once per task (never for duplicates).
//! - Calling [`Scheduler::delete`](crate::Scheduler::delete) for the same task
//!   from inside `on_task_executed` and awaiting it never completes.
//!
//! ## Example
//! ```rust
//! use delayvisor::{Callback, Cause, HandlerResult};
//!
//! struct Audit;
//!
//! impl Callback<String> for Audit {
//!     fn on_task_executed(
//!         &self,
//!         id: &str,
//!         name: &str,
//!         cause: Cause,
//!         outcome: Option<HandlerResult<String>>,
//!     ) {
//!         println!("{id} {name} {cause} {:?}", outcome.map(|r| r.is_ok()));
//!     }
//!
//!     fn name(&self) -> &'static str { "audit" }
//! }
//! ```

use tokio::time::Instant;

use crate::error::HandlerResult;
use crate::tasks::Cause;

/// Observer of scheduler and task lifecycle notifications.
pub trait Callback<T>: Send + Sync + 'static {
    /// A task was registered and will run at `exec_at`.
    fn on_task_added(&self, _id: &str, _name: &str, _exec_at: Instant) {}

    /// A task reached its terminal cause.
    ///
    /// `outcome` is `None` for [`Cause::Canceled`] (the handler did not run),
    /// otherwise the handler's result, unchanged.
    fn on_task_executed(
        &self,
        _id: &str,
        _name: &str,
        _cause: Cause,
        _outcome: Option<HandlerResult<T>>,
    ) {
    }

    /// A task left the registry (finished, deleted, or swept by `stop`).
    fn on_task_removed(&self, _id: &str, _name: &str) {}

    /// Registration was refused because `name` is owned by live task `id`.
    fn on_task_duplicated(&self, _id: &str, _name: &str) {}

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Callback that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCallback;

impl<T> Callback<T> for NoopCallback {
    fn name(&self) -> &'static str {
        "noop"
    }
}
