//! # Lifecycle callbacks.
//!
//! The scheduler reports through a single [`Callback`] implementation taken
//! from its [`Config`](crate::Config).
//!
//! ```text
//! set/set_at ─────► on_task_added / on_task_duplicated
//! task worker ────► on_task_executed  (exactly once per task)
//! finish/delete ──► on_task_removed
//! ```
//!
//! Built-in implementations:
//! - [`NoopCallback`] default, ignores everything
//! - `LogWriter` logs every notification through `tracing` (feature `logging`)

mod callback;
#[cfg(feature = "logging")]
mod log;

pub use callback::{Callback, NoopCallback};
#[cfg(feature = "logging")]
pub use log::LogWriter;
