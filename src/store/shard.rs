//! # One partition of the sharded store.
//!
//! A [`Shard`] is a plain `HashMap` behind its own [`parking_lot::Mutex`].
//! Every operation takes the lock for its whole duration, so two calls on the
//! same shard are serialized while calls on different shards never touch the
//! same lock.

use std::collections::HashMap;

use parking_lot::Mutex;

/// Exclusive-access key/value partition.
pub(crate) struct Shard<V> {
    map: Mutex<HashMap<String, V>>,
}

impl<V> Shard<V> {
    pub(crate) fn new() -> Self {
        Self {
            map: Mutex::new(HashMap::new()),
        }
    }

    /// Applies `f` to the value under `key` while the partition is locked.
    pub(crate) fn get_with<R>(&self, key: &str, f: impl FnOnce(&V) -> R) -> Option<R> {
        self.map.lock().get(key).map(f)
    }

    /// Inserts or replaces; returns the previous value.
    pub(crate) fn set(&self, key: String, value: V) -> Option<V> {
        self.map.lock().insert(key, value)
    }

    /// Returns the current value, or stores `make()` if the key is absent.
    ///
    /// The check and the insert happen under one lock acquisition.
    /// The flag is `true` when the value was inserted by this call.
    pub(crate) fn get_or_set(&self, key: &str, make: impl FnOnce() -> V) -> (V, bool)
    where
        V: Clone,
    {
        let mut map = self.map.lock();
        if let Some(existing) = map.get(key) {
            return (existing.clone(), false);
        }
        let value = make();
        map.insert(key.to_owned(), value.clone());
        (value, true)
    }

    pub(crate) fn delete(&self, key: &str) -> Option<V> {
        self.map.lock().remove(key)
    }

    /// Removes the entry only if `pred` accepts its current value.
    pub(crate) fn remove_if(&self, key: &str, pred: impl FnOnce(&V) -> bool) -> Option<V> {
        let mut map = self.map.lock();
        if map.get(key).is_some_and(pred) {
            map.remove(key)
        } else {
            None
        }
    }

    pub(crate) fn count(&self) -> usize {
        self.map.lock().len()
    }

    /// Hands every stored value to `visit` and empties the partition.
    ///
    /// The lock is held for the whole sweep: no concurrent `set` can slip an
    /// entry in between the visit and the removal.
    pub(crate) fn cleanup<F>(&self, visit: &F)
    where
        F: Fn(V) + ?Sized,
    {
        let mut map = self.map.lock();
        for (_, value) in map.drain() {
            visit(value);
        }
    }
}
