//! # Task lifecycle engine.
//!
//! This module provides the task-related types:
//! - [`Task`] - handle to a self-driving task with a single terminal outcome
//! - [`TaskBuilder`] - wires observation callbacks before the worker starts
//! - [`Cause`] - why a task ended (canceled / timed out / early returned)
//! - [`Context`] - cancellation scope with an optional deadline
//! - [`TaskMetadata`] - task id and name

mod builder;
mod cause;
mod context;
mod metadata;
mod task;

pub use builder::TaskBuilder;
pub use cause::Cause;
pub use context::Context;
pub use metadata::TaskMetadata;
pub(crate) use metadata::new_task_id;
pub use task::Task;
