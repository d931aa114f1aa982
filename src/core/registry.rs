//! # Registry entry: a task plus the deadline scope it was scheduled under.
//!
//! The scheduler stores one [`Entry`] per registered task id. The entry keeps
//! the deadline [`Context`] separately from the task so the timer path and the
//! task path can be torn down independently.
//!
//! ```text
//! root ─► deadline ctx (Entry::deadline) ─► task ctx (owned by the worker)
//! ```
//!
//! ## Rules
//! - The scheduler owns an entry while it is registered.
//! - An entry goes back to the pool only after its deadline scope was
//!   cancelled and its task's completion barrier is open.

use crate::core::pool::Reset;
use crate::tasks::{Context, Task};

/// Pooled registry slot.
#[derive(Default)]
pub(crate) struct Entry {
    task: Option<Task>,
    deadline: Option<Context>,
}

impl Entry {
    pub(crate) fn fill(&mut self, task: Task, deadline: Context) {
        self.task = Some(task);
        self.deadline = Some(deadline);
    }

    pub(crate) fn task(&self) -> Option<&Task> {
        self.task.as_ref()
    }

    /// Cancels the deadline scope only; the task observes it as parent cancellation.
    pub(crate) fn release_deadline(&self) {
        if let Some(deadline) = &self.deadline {
            deadline.cancel();
        }
    }

    /// Cancels the deadline scope and the task itself.
    pub(crate) fn cancel(&self) {
        self.release_deadline();
        if let Some(task) = &self.task {
            task.cancel();
        }
    }
}

impl Reset for Entry {
    fn reset(&mut self) {
        self.task = None;
        self.deadline = None;
    }
}
