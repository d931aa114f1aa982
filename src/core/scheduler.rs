//! # Scheduler: registers deadline-bound tasks and tears them down.
//!
//! The [`Scheduler`] owns a root [`Context`], a task registry (id → entry) and
//! an optional dedup table (name → id), both backed by the sharded [`Store`].
//!
//! ## Architecture
//! ```text
//! set/set_at(name, handler, exec_at)
//!   ├─► closed?                         ─► Err(Closed)
//!   ├─► unique && names.get_or_set(name) hit ─► on_task_duplicated, Ok(existing id)
//!   ├─► deadline = root.with_deadline(exec_at)
//!   ├─► Task { on_executed: callback, on_finished: reclaim(id) }.spawn(&deadline)
//!   ├─► registry.set(id, Entry { task, deadline })
//!   └─► on_task_added(id, name, exec_at)
//!
//! task worker ─► on_task_executed ─► barrier ─► on_finished ─► reclaim(id)
//!                                                     registry.delete(id)
//!                                                     names.remove_if(name == id)
//!                                                     on_task_removed
//!
//! stop()
//!   ├─► closed = true                  (waits out any set_at mid-registration)
//!   ├─► root.cancel()                  (every task not yet resolved → Canceled)
//!   ├─► registry.cleanup ∥ names.cleanup (parallel per-shard sweep, blocking pool)
//!   └─► wait swept tasks, on_task_removed each
//! ```
//!
//! ## Rules
//! - Registry removal happens exactly once per task: whoever takes the entry
//!   out of the store (finish hook, `delete`, or `stop`) releases it.
//! - With `unique`, two racing registrations of one name are serialized by the
//!   name's store partition; only one of them spawns a task.
//! - A `set_at` either registers before `stop` closes the scheduler or fails
//!   with `Closed`; nothing is registered after the sweep.
//! - Tasks may only be added from within a tokio runtime.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::pool::Pool;
use crate::core::registry::Entry;
use crate::error::{HandlerResult, SchedulerError};
use crate::store::Store;
use crate::tasks::{Context, Task, TaskBuilder, new_task_id};

/// Idle registry entries kept for reuse.
const ENTRY_POOL_CAPACITY: usize = 1024;

struct Inner<T> {
    cfg: Config<T>,
    /// Parent of every task's deadline scope.
    root: Context,
    /// id → registered task.
    registry: Store<Box<Entry>>,
    /// name → id of the live task holding it (only used when `cfg.unique`).
    names: Store<String>,
    entries: Pool<Entry>,
    closed: AtomicBool,
    /// Held shared by `set_at` from the `closed` check until the entry is
    /// registered, and exclusively by `stop` while it flips `closed`.
    admission: RwLock<()>,
    /// Cancelled once the first `stop` call finished its sweep.
    stopped: CancellationToken,
}

/// Deadline/delay task scheduler.
///
/// Cheap to clone; clones share the same registry.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use delayvisor::{Config, HandlerError, Scheduler};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), delayvisor::SchedulerError> {
/// let sched: Scheduler<String> = Scheduler::new(Config::default());
///
/// let id = sched.set("report", |_done| async {
///     Ok::<_, HandlerError>("sent".to_string())
/// }, Duration::from_millis(50))?;
///
/// let task = sched.get(&id)?;
/// task.wait().await;
///
/// sched.stop().await;
/// assert_eq!(sched.count(), 0);
/// # Ok(())
/// # }
/// ```
pub struct Scheduler<T> {
    inner: Arc<Inner<T>>,
}

impl<T: Send + 'static> Scheduler<T> {
    /// Creates a scheduler reading `callback` and `unique` from `cfg`.
    pub fn new(cfg: Config<T>) -> Self {
        Self {
            inner: Arc::new(Inner {
                cfg,
                root: Context::background(),
                registry: Store::new(),
                names: Store::new(),
                entries: Pool::new(ENTRY_POOL_CAPACITY),
                closed: AtomicBool::new(false),
                admission: RwLock::new(()),
                stopped: CancellationToken::new(),
            }),
        }
    }

    /// Schedules `handler` to run at `exec_at` and returns the task id.
    ///
    /// With deduplication enabled and a live task already holding `name`, no
    /// task is created: `on_task_duplicated` fires and the live task's id is
    /// returned instead.
    ///
    /// ### Errors
    /// [`SchedulerError::Closed`] after [`stop`](Scheduler::stop).
    pub fn set_at<F, Fut>(
        &self,
        name: impl Into<String>,
        handler: F,
        exec_at: Instant,
    ) -> Result<String, SchedulerError>
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = HandlerResult<T>> + Send + 'static,
    {
        let inner = &self.inner;
        // Recursive: a callback may register further tasks while this is held.
        let _admitted = inner.admission.read_recursive();
        if inner.closed.load(Ordering::Acquire) {
            return Err(SchedulerError::Closed);
        }

        let name = name.into();
        let id = new_task_id();

        if inner.cfg.unique {
            let (owner, reserved) = inner.names.get_or_set(&name, || id.clone());
            if !reserved {
                tracing::debug!(id = %owner, name = %name, "task name already scheduled");
                inner.cfg.callback.on_task_duplicated(&owner, &name);
                return Ok(owner);
            }
        }

        let deadline = inner.root.with_deadline(exec_at);
        let callback = Arc::clone(&inner.cfg.callback);
        let owner: Weak<Inner<T>> = Arc::downgrade(inner);
        let task = TaskBuilder::new(name, handler)
            .with_id(id.clone())
            .on_executed(move |meta, cause, outcome| {
                callback.on_task_executed(meta.id(), meta.name(), cause, outcome);
            })
            .on_finished(move |meta| {
                if let Some(inner) = owner.upgrade() {
                    inner.reclaim(meta.id());
                }
            })
            .spawn(&deadline);

        let mut entry = inner.entries.get();
        entry.fill(task.clone(), deadline);
        inner.registry.set(id.clone(), entry);
        tracing::debug!(id = %id, name = task.name(), "task scheduled");
        inner.cfg.callback.on_task_added(&id, task.name(), exec_at);

        // A deadline already in the past can finish the task before it was
        // registered; its finish hook then found nothing to reclaim.
        if task.is_finished() {
            inner.reclaim(&id);
        }
        Ok(id)
    }

    /// Schedules `handler` to run after `delay`. See [`set_at`](Scheduler::set_at).
    pub fn set<F, Fut>(
        &self,
        name: impl Into<String>,
        handler: F,
        delay: Duration,
    ) -> Result<String, SchedulerError>
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = HandlerResult<T>> + Send + 'static,
    {
        self.set_at(name, handler, Instant::now() + delay)
    }

    /// Returns the registered task with this id.
    ///
    /// ### Errors
    /// [`SchedulerError::TaskNotFound`] if the id is unknown or already finished.
    pub fn get(&self, id: &str) -> Result<Task, SchedulerError> {
        self.inner
            .registry
            .get_with(id, |entry| entry.task().cloned())
            .flatten()
            .ok_or_else(|| SchedulerError::TaskNotFound { id: id.to_owned() })
    }

    /// Cancels the task, waits for its worker to exit and unregisters it.
    ///
    /// A task already running its handler is not interrupted; this waits for
    /// the handler to return.
    ///
    /// ### Errors
    /// [`SchedulerError::TaskNotFound`] if the id is unknown or already finished.
    pub async fn delete(&self, id: &str) -> Result<(), SchedulerError> {
        let entry = self
            .inner
            .registry
            .delete(id)
            .ok_or_else(|| SchedulerError::TaskNotFound { id: id.to_owned() })?;

        entry.cancel();
        if let Some(task) = entry.task() {
            task.wait().await;
        }
        self.inner.release(entry);
        Ok(())
    }

    /// Number of registered, not yet finished tasks.
    pub fn count(&self) -> usize {
        self.inner.registry.count()
    }

    /// True once [`stop`](Scheduler::stop) was called.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Cancels every task and empties the registry.
    ///
    /// Idempotent: later calls wait for the first one to finish. Tasks whose
    /// handler is already running are waited for, not interrupted.
    pub async fn stop(&self) {
        let inner = &self.inner;
        let already = {
            let _exclusive = inner.admission.write();
            inner.closed.swap(true, Ordering::AcqRel)
        };
        if already {
            inner.stopped.cancelled().await;
            return;
        }

        tracing::debug!(registered = inner.registry.count(), "scheduler stopping");
        inner.root.cancel();

        // The sweep fans out over OS threads; keep it off the async workers.
        let sweeper = Arc::clone(inner);
        let swept = match tokio::task::spawn_blocking(move || sweeper.sweep()).await {
            Ok(swept) => swept,
            Err(err) => {
                tracing::warn!(error = %err, "registry sweep failed");
                Vec::new()
            }
        };

        join_all(swept.iter().filter_map(|entry| entry.task()).map(|task| task.wait())).await;
        let removed = swept.len();
        for entry in swept {
            inner.release(entry);
        }

        tracing::debug!(removed, "scheduler stopped");
        inner.stopped.cancel();
    }
}

impl<T: 'static> Inner<T> {
    /// Empties both stores in parallel, cancelling every swept entry.
    fn sweep(&self) -> Vec<Box<Entry>> {
        let swept = Mutex::new(Vec::new());
        std::thread::scope(|scope| {
            scope.spawn(|| self.names.cleanup(|_| {}));
            self.registry.cleanup(|entry: Box<Entry>| {
                entry.cancel();
                swept.lock().push(entry);
            });
        });
        swept.into_inner()
    }

    /// Finish hook: unregisters `id` unless someone already did.
    fn reclaim(&self, id: &str) {
        if let Some(entry) = self.registry.delete(id) {
            self.release(entry);
        }
    }

    /// Tears down an entry that was already taken out of the registry.
    fn release(&self, entry: Box<Entry>) {
        entry.release_deadline();
        if let Some(task) = entry.task() {
            if self.cfg.unique {
                self.names.remove_if(task.name(), |owner| owner == task.id());
            }
            tracing::debug!(id = task.id(), name = task.name(), "task removed");
            self.cfg.callback.on_task_removed(task.id(), task.name());
        }
        self.entries.put(entry);
    }
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

impl<T: Send + 'static> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<T> Clone for Scheduler<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use tokio::time;

    use crate::callbacks::Callback;
    use crate::error::HandlerError;
    use crate::tasks::Cause;

    type Outcome = Option<Result<String, String>>;

    #[derive(Default)]
    struct Recorder {
        added: Mutex<Vec<String>>,
        executed: Mutex<Vec<(String, Cause, Outcome)>>,
        removed: Mutex<Vec<String>>,
        duplicated: Mutex<Vec<(String, String)>>,
    }

    impl Recorder {
        fn causes(&self) -> Vec<Cause> {
            self.executed.lock().iter().map(|(_, c, _)| *c).collect()
        }

        fn executed_for(&self, id: &str) -> Vec<(Cause, Outcome)> {
            self.executed
                .lock()
                .iter()
                .filter(|(i, _, _)| i == id)
                .map(|(_, c, o)| (*c, o.clone()))
                .collect()
        }
    }

    impl Callback<String> for Recorder {
        fn on_task_added(&self, id: &str, _name: &str, _exec_at: Instant) {
            self.added.lock().push(id.to_owned());
        }

        fn on_task_executed(
            &self,
            id: &str,
            _name: &str,
            cause: Cause,
            outcome: Option<HandlerResult<String>>,
        ) {
            let outcome = outcome.map(|r| r.map_err(|e| e.to_string()));
            self.executed.lock().push((id.to_owned(), cause, outcome));
        }

        fn on_task_removed(&self, id: &str, _name: &str) {
            self.removed.lock().push(id.to_owned());
        }

        fn on_task_duplicated(&self, id: &str, name: &str) {
            self.duplicated.lock().push((id.to_owned(), name.to_owned()));
        }
    }

    fn scheduler(unique: bool) -> (Scheduler<String>, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let cfg = Config::default()
            .with_callback(recorder.clone())
            .with_uniqued(unique);
        (Scheduler::new(cfg), recorder)
    }

    async fn eventually(what: &str, cond: impl Fn() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !cond() {
            assert!(Instant::now() < deadline, "timed out waiting for: {what}");
            time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_set_fires_after_delay() {
        let (sched, rec) = scheduler(false);

        let mut ids = Vec::new();
        for i in 0..10 {
            let id = sched
                .set(
                    "test",
                    move |_done| async move { Ok::<_, HandlerError>(format!("test task: {i}")) },
                    Duration::from_millis(200),
                )
                .unwrap();
            assert!(sched.get(&id).is_ok());
            ids.push(id);
        }
        assert_eq!(sched.count(), 10);

        time::sleep(Duration::from_millis(500)).await;
        eventually("all tasks reclaimed", || sched.count() == 0).await;

        for (i, id) in ids.iter().enumerate() {
            assert_eq!(
                rec.executed_for(id),
                vec![(Cause::TimedOut, Some(Ok(format!("test task: {i}"))))]
            );
        }
        assert_eq!(rec.removed.lock().len(), 10);

        sched.stop().await;
        assert_eq!(sched.count(), 0);
    }

    #[tokio::test]
    async fn test_set_at_respects_deadline() {
        let (sched, rec) = scheduler(false);
        let started = Instant::now();

        let id = sched
            .set_at(
                "test",
                |_done| async { Ok::<_, HandlerError>("at".to_string()) },
                started + Duration::from_millis(200),
            )
            .unwrap();

        let task = sched.get(&id).unwrap();
        task.wait().await;
        let elapsed = started.elapsed();

        assert!(elapsed >= Duration::from_millis(200), "fired early: {elapsed:?}");
        assert!(elapsed < Duration::from_secs(2), "fired late: {elapsed:?}");
        assert_eq!(
            rec.executed_for(&id),
            vec![(Cause::TimedOut, Some(Ok("at".to_string())))]
        );
        sched.stop().await;
    }

    #[tokio::test]
    async fn test_delete_cancels_before_deadline() {
        let (sched, rec) = scheduler(true);

        for i in 0..10 {
            let id = sched
                .set_at(
                    "test",
                    move |_done| async move { Ok::<_, HandlerError>(format!("test task: {i}")) },
                    Instant::now() + Duration::from_millis(200),
                )
                .unwrap();
            assert!(sched.get(&id).is_ok());
            assert_eq!(sched.inner.names.count(), 1);
            assert_eq!(sched.inner.registry.count(), 1);

            sched.delete(&id).await.unwrap();

            assert_eq!(
                sched.get(&id).unwrap_err(),
                SchedulerError::TaskNotFound { id: id.clone() }
            );
            assert_eq!(sched.inner.names.count(), 0);
            assert_eq!(rec.executed_for(&id), vec![(Cause::Canceled, None)]);
        }

        time::sleep(Duration::from_millis(500)).await;
        assert!(rec.causes().iter().all(|c| *c == Cause::Canceled));
        assert_eq!(rec.causes().len(), 10);
        assert_eq!(rec.removed.lock().len(), 10);

        sched.stop().await;
        assert_eq!(sched.count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let (sched, _rec) = scheduler(false);
        assert_eq!(
            sched.delete("missing").await,
            Err(SchedulerError::TaskNotFound { id: "missing".into() })
        );
        assert!(matches!(
            sched.get("missing"),
            Err(SchedulerError::TaskNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_early_return_through_handle() {
        let (sched, rec) = scheduler(false);
        let id = sched
            .set(
                "early",
                |_done| async { Ok::<_, HandlerError>("now".to_string()) },
                Duration::from_secs(10),
            )
            .unwrap();

        sched.get(&id).unwrap().early_return();
        eventually("task reclaimed", || sched.count() == 0).await;

        assert_eq!(
            rec.executed_for(&id),
            vec![(Cause::EarlyReturned, Some(Ok("now".to_string())))]
        );
        sched.stop().await;
    }

    #[tokio::test]
    async fn test_dedup_returns_live_id() {
        let (sched, rec) = scheduler(true);
        let handler = |_done: CancellationToken| async { Ok::<_, HandlerError>("test task".to_string()) };

        let id1 = sched
            .set_at("test", handler, Instant::now() + Duration::from_millis(200))
            .unwrap();
        assert!(sched.get(&id1).is_ok());

        let id2 = sched
            .set_at("test", handler, Instant::now() + Duration::from_millis(200))
            .unwrap();
        assert_eq!(id1, id2, "task ids should be equal");
        assert_eq!(*rec.duplicated.lock(), vec![(id1.clone(), "test".to_string())]);
        assert_eq!(sched.count(), 1);

        time::sleep(Duration::from_millis(500)).await;
        eventually("first task reclaimed", || sched.count() == 0).await;

        let id3 = sched
            .set_at("test", handler, Instant::now() + Duration::from_millis(200))
            .unwrap();
        assert_ne!(id1, id3, "task ids should differ once the first resolved");
        assert_eq!(rec.duplicated.lock().len(), 1);

        sched.stop().await;
        assert_eq!(sched.count(), 0);
    }

    #[tokio::test]
    async fn test_same_name_without_dedup() {
        let (sched, rec) = scheduler(false);
        let handler = |_done: CancellationToken| async { Ok::<_, HandlerError>(String::new()) };

        let id1 = sched.set("same", handler, Duration::from_secs(10)).unwrap();
        let id2 = sched.set("same", handler, Duration::from_secs(10)).unwrap();

        assert_ne!(id1, id2);
        assert_eq!(sched.count(), 2);
        assert!(rec.duplicated.lock().is_empty());
        sched.stop().await;
    }

    #[tokio::test]
    async fn test_stop_cancels_everything() {
        let (sched, rec) = scheduler(true);
        for i in 0..10 {
            sched
                .set_at(
                    format!("test-{i}"),
                    |_done| async { Ok::<_, HandlerError>(String::new()) },
                    Instant::now() + Duration::from_millis(200),
                )
                .unwrap();
        }

        sched.stop().await;

        assert_eq!(sched.count(), 0);
        assert_eq!(sched.inner.names.count(), 0);
        assert_eq!(rec.causes(), vec![Cause::Canceled; 10]);
        assert_eq!(rec.removed.lock().len(), 10);
        assert!(sched.is_closed());

        // Nothing fires later, and stopping again is a no-op.
        time::sleep(Duration::from_millis(300)).await;
        assert_eq!(rec.causes().len(), 10);
        sched.stop().await;
        assert_eq!(sched.count(), 0);
    }

    #[tokio::test]
    async fn test_set_after_stop_is_rejected() {
        let (sched, rec) = scheduler(false);
        sched.stop().await;

        let res = sched.set(
            "late",
            |_done| async { Ok::<_, HandlerError>(String::new()) },
            Duration::from_millis(10),
        );
        assert_eq!(res, Err(SchedulerError::Closed));
        assert!(rec.added.lock().is_empty());
    }

    #[tokio::test]
    async fn test_past_deadline_is_reclaimed() {
        let (sched, rec) = scheduler(true);
        let id = sched
            .set_at(
                "past",
                |_done| async { Ok::<_, HandlerError>("late".to_string()) },
                Instant::now() - Duration::from_millis(5),
            )
            .unwrap();

        eventually("past task reclaimed", || sched.count() == 0).await;
        assert_eq!(
            rec.executed_for(&id),
            vec![(Cause::TimedOut, Some(Ok("late".to_string())))]
        );
        eventually("name released", || sched.inner.names.count() == 0).await;
        assert_eq!(*rec.removed.lock(), vec![id]);
        sched.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registration_then_stop() {
        let (sched, rec) = scheduler(false);
        let callers = 8;
        let per_caller = 125;

        let handles: Vec<_> = (0..callers)
            .map(|c| {
                let sched = sched.clone();
                tokio::spawn(async move {
                    (0..per_caller)
                        .map(|i| {
                            sched
                                .set(
                                    format!("task-{c}-{i}"),
                                    |_done| async { Ok::<_, HandlerError>(String::new()) },
                                    Duration::from_secs(30),
                                )
                                .unwrap()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids = HashSet::new();
        for h in handles {
            ids.extend(h.await.unwrap());
        }
        assert_eq!(ids.len(), 1000);
        assert_eq!(sched.count(), 1000);

        sched.stop().await;
        assert_eq!(sched.count(), 0);

        // Finish hooks racing the sweep may still be reporting their removal.
        eventually("removals reported", || rec.removed.lock().len() == 1000).await;

        let executed = rec.executed.lock();
        assert_eq!(executed.len(), 1000);
        let reported: HashSet<_> = executed.iter().map(|(id, _, _)| id.clone()).collect();
        assert_eq!(reported, ids);
        assert!(executed.iter().all(|(_, c, o)| *c == Cause::Canceled && o.is_none()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_dedup_single_winner() {
        let (sched, rec) = scheduler(true);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let sched = sched.clone();
                tokio::spawn(async move {
                    sched
                        .set(
                            "shared",
                            |_done| async { Ok::<_, HandlerError>(String::new()) },
                            Duration::from_secs(30),
                        )
                        .unwrap()
                })
            })
            .collect();

        let mut ids = HashSet::new();
        for h in handles {
            ids.insert(h.await.unwrap());
        }

        assert_eq!(ids.len(), 1);
        assert_eq!(sched.count(), 1);
        assert_eq!(rec.added.lock().len(), 1);
        assert_eq!(rec.duplicated.lock().len(), 15);
        sched.stop().await;
    }

    struct LookupOnAdd {
        sched: std::sync::OnceLock<Scheduler<String>>,
        found: Mutex<Vec<bool>>,
    }

    impl Callback<String> for LookupOnAdd {
        fn on_task_added(&self, id: &str, _name: &str, _exec_at: Instant) {
            let found = self.sched.get().is_some_and(|sched| sched.get(id).is_ok());
            self.found.lock().push(found);
        }
    }

    #[tokio::test]
    async fn test_task_visible_from_added_callback() {
        let lookup = Arc::new(LookupOnAdd {
            sched: std::sync::OnceLock::new(),
            found: Mutex::new(Vec::new()),
        });
        let sched = Scheduler::new(Config::default().with_callback(lookup.clone()));
        let _ = lookup.sched.set(sched.clone());

        sched
            .set("visible", |_done| async { Ok::<_, HandlerError>(String::new()) }, Duration::from_secs(30))
            .unwrap();
        assert_eq!(*lookup.found.lock(), vec![true]);
        sched.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_registration_racing_stop_leaves_nothing_behind() {
        for _ in 0..50 {
            let (sched, rec) = scheduler(false);
            let setters: Vec<_> = (0..6)
                .map(|c| {
                    let sched = sched.clone();
                    tokio::spawn(async move {
                        let mut accepted = 0usize;
                        for i in 0..20 {
                            match sched.set(
                                format!("race-{c}-{i}"),
                                |_done| async { Ok::<_, HandlerError>(String::new()) },
                                Duration::from_secs(30),
                            ) {
                                Ok(_) => accepted += 1,
                                Err(err) => assert_eq!(err, SchedulerError::Closed),
                            }
                            tokio::task::yield_now().await;
                        }
                        accepted
                    })
                })
                .collect();

            tokio::task::yield_now().await;
            sched.stop().await;
            assert_eq!(sched.count(), 0, "task registered after stop");

            let mut accepted = 0usize;
            for h in setters {
                accepted += h.await.unwrap();
            }
            assert_eq!(sched.count(), 0);
            eventually("removals reported", || rec.removed.lock().len() == accepted).await;
            assert!(rec.causes().iter().all(|c| *c == Cause::Canceled));
        }
    }

    #[tokio::test]
    async fn test_stop_on_current_thread_runtime() {
        let (sched, rec) = scheduler(true);
        for i in 0..200 {
            sched
                .set(
                    format!("single-{i}"),
                    |_done| async { Ok::<_, HandlerError>(String::new()) },
                    Duration::from_secs(30),
                )
                .unwrap();
        }

        sched.stop().await;

        assert_eq!(sched.count(), 0);
        assert_eq!(sched.inner.names.count(), 0);
        assert_eq!(rec.removed.lock().len(), 200);
    }

    #[tokio::test]
    async fn test_entries_are_recycled() {
        let (sched, _rec) = scheduler(false);
        for _ in 0..4 {
            let id = sched
                .set("pooled", |_done| async { Ok::<_, HandlerError>(String::new()) }, Duration::from_secs(30))
                .unwrap();
            sched.delete(&id).await.unwrap();
        }
        assert_eq!(sched.inner.entries.idle(), 1);
        sched.stop().await;
    }
}
