use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::error::HandlerResult;
use crate::tasks::context::Context;
use crate::tasks::metadata::{TaskMetadata, new_task_id};
use crate::tasks::task::{BoxHandler, ExecutedHook, FinishedHook, Task};
use crate::tasks::Cause;

/// Builder for [`Task`] with fluent API.
///
/// Both observation points are wired **before** the worker starts, so a task
/// whose deadline has already passed still reports through them.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use delayvisor::{Context, HandlerError, Task};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let parent = Context::background().with_timeout(Duration::from_millis(10));
/// let task = Task::builder("hello", |_done| async { Ok::<_, HandlerError>(42) })
///     .on_executed(|meta, cause, outcome| {
///         println!("{} {cause}: {:?}", meta.name(), outcome.map(|r| r.ok()));
///     })
///     .spawn(&parent);
/// task.wait().await;
/// # }
/// ```
pub struct TaskBuilder<T> {
    id: Option<String>,
    name: String,
    handler: BoxHandler<T>,
    on_executed: Option<ExecutedHook<T>>,
    on_finished: Option<FinishedHook>,
}

impl<T: Send + 'static> TaskBuilder<T> {
    /// Creates a builder for a task named `name` running `handler`.
    pub fn new<F, Fut>(name: impl Into<String>, handler: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = HandlerResult<T>> + Send + 'static,
    {
        Self {
            id: None,
            name: name.into(),
            handler: Box::new(move |done| handler(done).boxed()),
            on_executed: None,
            on_finished: None,
        }
    }

    /// Uses a pre-generated id instead of a fresh one.
    pub(crate) fn with_id(mut self, id: String) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the execution callback: receives the cause and, unless the task
    /// was canceled, the handler's result.
    pub fn on_executed<C>(mut self, callback: C) -> Self
    where
        C: FnOnce(&TaskMetadata, Cause, Option<HandlerResult<T>>) + Send + 'static,
    {
        self.on_executed = Some(Box::new(callback));
        self
    }

    /// Sets the finish callback: fires once the task can produce no further
    /// side effects, after the completion barrier is released.
    pub fn on_finished<C>(mut self, callback: C) -> Self
    where
        C: FnOnce(&TaskMetadata) + Send + 'static,
    {
        self.on_finished = Some(Box::new(callback));
        self
    }

    /// Starts the supervising worker under `parent` and returns its handle.
    ///
    /// Never blocks. Must be called from within a tokio runtime.
    pub fn spawn(self, parent: &Context) -> Task {
        let id = self.id.unwrap_or_else(new_task_id);
        Task::start(
            parent,
            TaskMetadata::new(id, self.name),
            self.handler,
            self.on_executed,
            self.on_finished,
        )
    }
}
