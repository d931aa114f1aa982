//! # Cancellable, optionally deadline-bound contexts.
//!
//! A [`Context`] pairs a [`CancellationToken`] with an optional deadline.
//! Contexts form a tree: a child derived with [`Context::with_cancel`] or
//! [`Context::with_deadline`] is cancelled whenever its parent is, and its
//! deadline is never later than its parent's.
//!
//! ```text
//! root (Scheduler)            token R, no deadline
//!   └─ with_deadline(t1)      token R.child, deadline t1
//!        └─ with_cancel()     token R.child.child, deadline t1   (owned by the task)
//! ```
//!
//! The deadline is observed by whoever waits on [`Context::done`]; cancelling
//! a context never touches its parent.

use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

/// Cancellation scope with an optional deadline.
#[derive(Clone, Debug)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// An empty root: never cancelled unless asked, no deadline.
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Derives a child that can be cancelled on its own.
    pub fn with_cancel(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Derives a child that expires at `at` (or earlier, if the parent does).
    pub fn with_deadline(&self, at: Instant) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: Some(self.deadline.map_or(at, |parent| parent.min(at))),
        }
    }

    /// Shorthand for `with_deadline(Instant::now() + timeout)`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Cancels this context and every context derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// True once this context (or an ancestor) was cancelled.
    ///
    /// An elapsed deadline alone does not count as cancellation.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The effective deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The underlying token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Resolves once the context is cancelled or its deadline has passed.
    pub async fn done(&self) {
        match self.deadline {
            Some(at) => {
                tokio::select! {
                    _ = self.token.cancelled() => {}
                    _ = time::sleep_until(at) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}
