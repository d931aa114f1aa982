//! # Task: a self-driving, single-outcome unit of work.
//!
//! A [`Task`] is created with a parent [`Context`], a name and a handler. Its
//! supervising worker is spawned immediately and is the only party that
//! reports the outcome.
//!
//! ## Lifecycle
//! ```text
//! spawn ──► running ──► terminal (one Cause) ──► finished
//!              │
//!              ├─ cancel() / parent cancelled ─► Canceled       (handler skipped)
//!              ├─ deadline elapsed            ─► TimedOut       (handler runs)
//!              └─ early_return()              ─► EarlyReturned  (handler runs)
//! ```
//!
//! ## Worker
//! ```text
//! wait on token / deadline
//!   └─► read cause from Signal
//!         └─► run handler (unless Canceled)
//!               └─► on_executed(meta, cause, outcome)
//!                     └─► release context, open completion barrier
//!                           └─► on_finished(meta)
//! ```
//!
//! ## Rules
//! - Exactly one cause per task; `cancel` and `early_return` are idempotent
//!   and lose silently against an earlier transition.
//! - `on_executed` fires strictly before `on_finished`.
//! - [`Task::wait`] returns once the completion barrier is open; it is safe to
//!   call from many places and after the task has finished.
//! - A handler that never returns keeps `wait` pending forever.
//! - Awaiting `wait` from inside the task's own `on_executed` never resolves.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::{HandlerError, HandlerPanic, HandlerResult};
use crate::tasks::builder::TaskBuilder;
use crate::tasks::cause::{Cause, Signal};
use crate::tasks::context::Context;
use crate::tasks::metadata::TaskMetadata;

pub(crate) type BoxHandler<T> =
    Box<dyn FnOnce(CancellationToken) -> BoxFuture<'static, HandlerResult<T>> + Send>;
pub(crate) type ExecutedHook<T> =
    Box<dyn FnOnce(&TaskMetadata, Cause, Option<HandlerResult<T>>) + Send>;
pub(crate) type FinishedHook = Box<dyn FnOnce(&TaskMetadata) + Send>;

#[derive(Debug)]
struct Inner {
    metadata: TaskMetadata,
    signal: Signal,
    /// Completion barrier: cancelled once the worker is done with the task.
    done: CancellationToken,
}

/// Handle to a scheduled task. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Task {
    inner: Arc<Inner>,
}

impl Task {
    /// Starts a task under `parent` with no observation callbacks.
    ///
    /// The handler runs when `parent`'s deadline elapses or on
    /// [`early_return`](Task::early_return); it is skipped if the task is
    /// cancelled first.
    pub fn new<T, F, Fut>(parent: &Context, name: impl Into<String>, handler: F) -> Self
    where
        T: Send + 'static,
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = HandlerResult<T>> + Send + 'static,
    {
        TaskBuilder::new(name, handler).spawn(parent)
    }

    /// Returns a [`TaskBuilder`] to wire callbacks before starting.
    pub fn builder<T, F, Fut>(name: impl Into<String>, handler: F) -> TaskBuilder<T>
    where
        T: Send + 'static,
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = HandlerResult<T>> + Send + 'static,
    {
        TaskBuilder::new(name, handler)
    }

    pub(crate) fn start<T: Send + 'static>(
        parent: &Context,
        metadata: TaskMetadata,
        handler: BoxHandler<T>,
        on_executed: Option<ExecutedHook<T>>,
        on_finished: Option<FinishedHook>,
    ) -> Self {
        let ctx = parent.with_cancel();
        let task = Task {
            inner: Arc::new(Inner {
                metadata,
                signal: Signal::new(ctx.token().clone()),
                done: CancellationToken::new(),
            }),
        };

        tokio::spawn(
            task.clone()
                .supervise(ctx, handler, on_executed, on_finished),
        );
        task
    }

    /// Requests cancellation; no effect once the task reached a terminal cause.
    pub fn cancel(&self) {
        self.inner.signal.resolve(Cause::Canceled);
    }

    /// Requests immediate execution; no effect once the task reached a terminal cause.
    pub fn early_return(&self) {
        self.inner.signal.resolve(Cause::EarlyReturned);
    }

    /// Waits until the worker has reported the outcome and released the task.
    pub async fn wait(&self) {
        self.inner.done.cancelled().await;
    }

    /// True once [`wait`](Task::wait) would return immediately.
    pub fn is_finished(&self) -> bool {
        self.inner.done.is_cancelled()
    }

    /// The terminal cause, `None` while still waiting for one.
    ///
    /// May be `Some` while the handler is still running.
    pub fn cause(&self) -> Option<Cause> {
        self.inner.signal.cause()
    }

    /// Id and name of this task.
    pub fn metadata(&self) -> &TaskMetadata {
        &self.inner.metadata
    }

    pub fn id(&self) -> &str {
        self.inner.metadata.id()
    }

    pub fn name(&self) -> &str {
        self.inner.metadata.name()
    }

    async fn supervise<T: Send + 'static>(
        self,
        ctx: Context,
        handler: BoxHandler<T>,
        on_executed: Option<ExecutedHook<T>>,
        on_finished: Option<FinishedHook>,
    ) {
        // Opens the barrier even if a callback unwinds through the worker.
        let barrier = self.inner.done.clone().drop_guard();

        let cause = self.observe(&ctx).await;
        tracing::trace!(task = self.id(), name = self.name(), cause = cause.as_label(), "task resolved");

        let outcome = if cause.runs_handler() {
            Some(self.execute(handler).await)
        } else {
            None
        };

        if let Some(hook) = on_executed {
            let meta = &self.inner.metadata;
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| hook(meta, cause, outcome))) {
                let panic = HandlerPanic::from_payload(payload.as_ref());
                tracing::warn!(task = self.id(), name = self.name(), error = %panic.message, "execution callback panicked");
            }
        }

        drop(ctx);
        drop(barrier);

        if let Some(hook) = on_finished {
            hook(&self.inner.metadata);
        }
    }

    /// Waits for the first terminal transition and returns the recorded cause.
    ///
    /// Parent cancellation wins over a deadline that elapses at the same time.
    async fn observe(&self, ctx: &Context) -> Cause {
        let signal = &self.inner.signal;
        match ctx.deadline() {
            Some(at) => {
                tokio::select! {
                    biased;
                    _ = signal.token().cancelled() => signal.resolve(Cause::Canceled),
                    _ = time::sleep_until(at) => signal.resolve(Cause::TimedOut),
                }
            }
            None => {
                signal.token().cancelled().await;
                signal.resolve(Cause::Canceled)
            }
        }
    }

    /// Runs the handler with the task's own (already fired) token.
    async fn execute<T>(&self, handler: BoxHandler<T>) -> HandlerResult<T> {
        let done = self.inner.signal.token().clone();
        match AssertUnwindSafe(async move { handler(done).await })
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(payload) => {
                let panic = HandlerPanic::from_payload(payload.as_ref());
                tracing::warn!(task = self.id(), name = self.name(), error = %panic.message, "handler panicked");
                Err(HandlerError::from(panic))
            }
        }
    }
}
