//! # Free-list of reusable boxed objects.
//!
//! [`Pool`] keeps up to `capacity` idle boxes. [`Pool::get`] pops one (or
//! allocates a fresh `E::default()`), [`Pool::put`] resets the object and keeps
//! it for the next caller.
//!
//! ## Rules
//! - Every object is [`Reset`] **before** it becomes visible to another owner.
//! - Callers return an object only once nothing else can reach its contents
//!   (for registry entries: after the task's completion barrier is open).
//! - Each scheduler owns its pool; there is no process-wide state.

use parking_lot::Mutex;

/// Clears all state carried by a pooled object.
pub(crate) trait Reset {
    fn reset(&mut self);
}

/// Bounded free-list.
pub(crate) struct Pool<E> {
    free: Mutex<Vec<Box<E>>>,
    capacity: usize,
}

impl<E: Reset + Default> Pool<E> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            capacity,
        }
    }

    pub(crate) fn get(&self) -> Box<E> {
        self.free.lock().pop().unwrap_or_default()
    }

    /// Resets `item` and keeps it unless the pool is full.
    pub(crate) fn put(&self, mut item: Box<E>) {
        item.reset();
        let mut free = self.free.lock();
        if free.len() < self.capacity {
            free.push(item);
        }
    }

    /// Number of idle objects.
    pub(crate) fn idle(&self) -> usize {
        self.free.lock().len()
    }
}
