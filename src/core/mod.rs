//! Runtime core: orchestration and lifecycle.
//!
//! The only public API from this module is [`Scheduler`], which registers
//! tasks, deduplicates them by name, and tears them down on delete or stop.
//!
//! Internal modules:
//! - [`scheduler`]: task registration, lookup, deletion and shutdown;
//! - [`registry`]: registry entry pairing a task with its deadline scope;
//! - [`pool`]: free-list with reset-before-reuse for registry entries.

mod pool;
mod registry;
mod scheduler;

pub use scheduler::Scheduler;
