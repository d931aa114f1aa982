//! # delayvisor
//!
//! **Delayvisor** is a deadline/delay task scheduler for tokio.
//!
//! Register a handler with a name and an execution time; the scheduler runs it
//! exactly once, either when the deadline arrives or when told to run early,
//! or reports that it was cancelled first. Every outcome is delivered through
//! a [`Callback`].
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   set/set_at(name, handler, exec_at)      get / delete / count / stop
//!                  │                                  │
//!                  ▼                                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Scheduler                                                        │
//! │  - root Context (parent of every task's deadline scope)           │
//! │  - registry: Store<id → Entry{Task, deadline Context}>            │
//! │  - names:    Store<name → id>            (only with `unique`)     │
//! │  - entry Pool (reset before reuse)                                │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────┐       ┌──────────┐       ┌──────────┐
//!     │  Task    │       │  Task    │       │  Task    │   one tokio worker each
//!     │ (worker) │       │ (worker) │       │ (worker) │
//!     └────┬─────┘       └────┬─────┘       └────┬─────┘
//!          │ on_task_executed(id, name, cause, outcome)
//!          │ on_finished ─► Scheduler reclaims id ─► on_task_removed
//!          ▼
//!     Callback (user)
//! ```
//!
//! ### Store
//! ```text
//! key ─► xxh64(key) & (SHARD_COUNT - 1) ─► shard[i]: Mutex<HashMap<String, V>>
//! ```
//! Partitions are locked independently; there is no global lock.
//!
//! ### Task lifecycle
//! ```text
//! running ──┬─ cancel() / parent cancelled ─► Canceled       (handler skipped)
//!           ├─ deadline elapsed            ─► TimedOut       (handler runs)
//!           └─ early_return()              ─► EarlyReturned  (handler runs)
//!                 └─► on_executed ─► completion barrier ─► on_finished
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits               |
//! |-------------------|--------------------------------------------------------------|----------------------------------|
//! | **Scheduling**    | Run handlers at a deadline, early, or cancel them.           | [`Scheduler`]                    |
//! | **Tasks**         | Self-driving single-outcome units with a completion barrier. | [`Task`], [`TaskBuilder`]        |
//! | **Outcomes**      | Exactly one terminal cause per task.                         | [`Cause`]                        |
//! | **Callbacks**     | Observe add / execute / remove / duplicate notifications.    | [`Callback`], [`NoopCallback`]   |
//! | **Storage**       | Sharded concurrent map backing the registry.                 | [`Store`]                        |
//! | **Errors**        | Typed errors for scheduler operations.                       | [`SchedulerError`]               |
//! | **Configuration** | Callback and name deduplication.                             | [`Config`]                       |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], a callback that logs through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use delayvisor::{Callback, Cause, Config, HandlerError, HandlerResult, Scheduler};
//!
//! struct Printer;
//!
//! impl Callback<String> for Printer {
//!     fn on_task_executed(&self, id: &str, name: &str, cause: Cause, outcome: Option<HandlerResult<String>>) {
//!         println!("{name} ({id}): {cause} {:?}", outcome.map(|r| r.ok()));
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::default()
//!         .with_callback(Arc::new(Printer))
//!         .with_uniqued(true);
//!     let sched = Scheduler::new(cfg);
//!
//!     // Runs after 50ms unless deleted first.
//!     let id = sched.set("greet", |_done| async {
//!         Ok::<_, HandlerError>("hello".to_string())
//!     }, Duration::from_millis(50))?;
//!
//!     // Same name while the first is live: same id, `on_task_duplicated` fires.
//!     let again = sched.set("greet", |_done| async {
//!         Ok::<_, HandlerError>("ignored".to_string())
//!     }, Duration::from_millis(50))?;
//!     assert_eq!(id, again);
//!
//!     sched.get(&id)?.wait().await;
//!     sched.stop().await;
//!     assert_eq!(sched.count(), 0);
//!     Ok(())
//! }
//! ```
mod callbacks;
mod config;
mod core;
mod error;
mod store;
mod tasks;

// ---- Public re-exports ----

pub use callbacks::{Callback, NoopCallback};
pub use config::Config;
pub use core::Scheduler;
pub use error::{HandlerError, HandlerPanic, HandlerResult, SchedulerError};
pub use store::{SHARD_COUNT, Store};
pub use tasks::{Cause, Context, Task, TaskBuilder, TaskMetadata};

// Optional: expose a built-in logging callback.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use callbacks::LogWriter;
