//! # Scheduler configuration.
//!
//! [`Config`] is a frozen record read once by [`Scheduler::new`](crate::Scheduler::new):
//! - `callback`: receives lifecycle notifications ([`NoopCallback`] by default)
//! - `unique`: deduplicate live tasks by name (`false` by default)
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use delayvisor::{Config, NoopCallback, Scheduler};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let cfg: Config<String> = Config::default()
//!     .with_callback(Arc::new(NoopCallback))
//!     .with_uniqued(true);
//! assert!(cfg.unique);
//!
//! let sched = Scheduler::new(cfg);
//! sched.stop().await;
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use crate::callbacks::{Callback, NoopCallback};

/// Configuration for a [`Scheduler`](crate::Scheduler).
pub struct Config<T> {
    /// Receiver of add/execute/remove/duplicate notifications.
    pub callback: Arc<dyn Callback<T>>,

    /// When `true`, at most one live task may hold a given name; a second
    /// registration returns the live task's id and fires `on_task_duplicated`.
    pub unique: bool,
}

impl<T> Config<T> {
    /// Replaces the callback.
    pub fn with_callback(mut self, callback: Arc<dyn Callback<T>>) -> Self {
        self.callback = callback;
        self
    }

    /// Enables or disables name deduplication.
    pub fn with_uniqued(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }
}

impl<T: 'static> Default for Config<T> {
    /// Default configuration:
    ///
    /// - `callback = NoopCallback`
    /// - `unique = false`
    fn default() -> Self {
        Self {
            callback: Arc::new(NoopCallback),
            unique: false,
        }
    }
}

impl<T> Clone for Config<T> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
            unique: self.unique,
        }
    }
}

impl<T: 'static> fmt::Debug for Config<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("callback", &self.callback.name())
            .field("unique", &self.unique)
            .finish()
    }
}
