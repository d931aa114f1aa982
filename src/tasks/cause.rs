//! # Terminal causes and the single-fire cause cell.
//!
//! A task ends for exactly one [`Cause`]. The cause is written once into a
//! [`Signal`] by whoever wins the compare-and-swap, and only then is the
//! task's cancellation token fired. The worker that wakes up on the token
//! reads the cause back, so the outcome never depends on which wake-up path
//! happened to be observed first.
//!
//! ```text
//! cancel()        ──┐
//! early_return()  ──┼─► Signal::resolve(cause) ─► CAS RUNNING → cause ─► token.cancel()
//! deadline/parent ──┘                               (first caller wins)
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use tokio_util::sync::CancellationToken;

/// Why a task reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cause {
    /// Stopped before its deadline and before an early-return request.
    /// The handler is **not** invoked.
    Canceled,
    /// The deadline elapsed; the handler ran.
    TimedOut,
    /// Execution was requested before the deadline; the handler ran.
    EarlyReturned,
}

impl Cause {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use delayvisor::Cause;
    ///
    /// assert_eq!(Cause::TimedOut.as_label(), "task_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            Cause::Canceled => "task_canceled",
            Cause::TimedOut => "task_timeout",
            Cause::EarlyReturned => "task_early_return",
        }
    }

    /// Whether a task ending with this cause invokes its handler.
    #[inline]
    pub fn runs_handler(&self) -> bool {
        !matches!(self, Cause::Canceled)
    }

    fn code(self) -> u8 {
        match self {
            Cause::Canceled => CANCELED,
            Cause::TimedOut => TIMED_OUT,
            Cause::EarlyReturned => EARLY_RETURNED,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            CANCELED => Some(Cause::Canceled),
            TIMED_OUT => Some(Cause::TimedOut),
            EARLY_RETURNED => Some(Cause::EarlyReturned),
            _ => None,
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Cause::Canceled => "task canceled",
            Cause::TimedOut => "task timeout",
            Cause::EarlyReturned => "task early return",
        })
    }
}

const RUNNING: u8 = 0;
const CANCELED: u8 = 1;
const TIMED_OUT: u8 = 2;
const EARLY_RETURNED: u8 = 3;

/// Cancellation token tagged with the reason it fired.
#[derive(Debug)]
pub(crate) struct Signal {
    state: AtomicU8,
    token: CancellationToken,
}

impl Signal {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self {
            state: AtomicU8::new(RUNNING),
            token,
        }
    }

    /// Records `cause` if nothing has been recorded yet, then fires the token.
    ///
    /// Returns the cause that is in effect after the call: `cause` itself if
    /// this call won, otherwise the earlier winner.
    pub(crate) fn resolve(&self, cause: Cause) -> Cause {
        match self
            .state
            .compare_exchange(RUNNING, cause.code(), Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                self.token.cancel();
                cause
            }
            // Only RUNNING is ever swapped out, so a failed CAS always holds a cause.
            Err(current) => Cause::from_code(current).unwrap_or(cause),
        }
    }

    /// The recorded cause, `None` while the task is still running.
    pub(crate) fn cause(&self) -> Option<Cause> {
        Cause::from_code(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }
}
