//! # Sharded concurrent key/value store.
//!
//! [`Store`] splits its key space over [`SHARD_COUNT`] independently locked
//! partitions. The partition of a key is `xxh64(key) & SHARD_MASK`, a pure
//! function of the key, so a key lives in exactly one partition for the
//! lifetime of the store.
//!
//! ## Architecture
//! ```text
//! set("a", v) ─► xxh64("a") & MASK = 17  ─► [shard 17: Mutex<HashMap>]
//! set("b", v) ─► xxh64("b") & MASK = 203 ─► [shard 203: Mutex<HashMap>]
//!                                            (no shared lock between them)
//!
//! cleanup(visit):
//!   shards[0..N] ─► chunks (one per core) ─► scoped worker ─► shard.cleanup(visit)
//! ```
//!
//! ## Rules
//! - There is no global lock: [`Store::count`] and [`Store::cleanup`] see each
//!   partition at a slightly different instant.
//! - No operation fails; a missing key reads as `None`.
//! - The scheduler uses one store as the task registry (id → entry) and one as
//!   the dedup table (name → id).

mod shard;

use std::num::NonZeroUsize;
use std::thread;

use xxhash_rust::xxh64::xxh64;

use shard::Shard;

/// Number of partitions (power of two so the hash can be masked).
pub const SHARD_COUNT: usize = 1 << 8;

const SHARD_MASK: u64 = (SHARD_COUNT as u64) - 1;

/// Hash-partitioned map from `String` keys to `V`.
pub struct Store<V> {
    shards: Box<[Shard<V>]>,
}

impl<V> Store<V> {
    /// Creates an empty store with [`SHARD_COUNT`] partitions.
    pub fn new() -> Self {
        Self {
            shards: (0..SHARD_COUNT).map(|_| Shard::new()).collect(),
        }
    }

    /// Returns the partition index for `key`.
    #[inline]
    pub fn shard_of(key: &str) -> usize {
        (xxh64(key.as_bytes(), 0) & SHARD_MASK) as usize
    }

    #[inline]
    fn shard(&self, key: &str) -> &Shard<V> {
        &self.shards[Self::shard_of(key)]
    }

    /// Returns a clone of the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        self.get_with(key, V::clone)
    }

    /// Applies `f` to the value under `key` without cloning it.
    ///
    /// `f` runs while the key's partition is locked; keep it short and never
    /// call back into the same store from it.
    pub fn get_with<R>(&self, key: &str, f: impl FnOnce(&V) -> R) -> Option<R> {
        self.shard(key).get_with(key, f)
    }

    /// Inserts `value`, replacing and returning any previous value.
    pub fn set(&self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        self.shard(&key).set(key, value)
    }

    /// Returns the value under `key`, inserting `make()` first if absent.
    ///
    /// The boolean is `true` when this call performed the insert. Two racing
    /// callers on the same key can never both see `true`.
    pub fn get_or_set(&self, key: &str, make: impl FnOnce() -> V) -> (V, bool)
    where
        V: Clone,
    {
        self.shard(key).get_or_set(key, make)
    }

    /// Removes and returns the value under `key`.
    pub fn delete(&self, key: &str) -> Option<V> {
        self.shard(key).delete(key)
    }

    /// Removes the value under `key` only if `pred` accepts it.
    pub fn remove_if(&self, key: &str, pred: impl FnOnce(&V) -> bool) -> Option<V> {
        self.shard(key).remove_if(key, pred)
    }

    /// Sums the partition sizes.
    pub fn count(&self) -> usize {
        self.shards.iter().map(Shard::count).sum()
    }

    /// Returns `true` when no partition holds a value.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Passes every stored value to `visit` and removes it.
    ///
    /// Partitions are swept in parallel: the shard array is split into one
    /// chunk per available core and each chunk is drained by a scoped thread.
    /// Returns once every partition has been swept.
    pub fn cleanup<F>(&self, visit: F)
    where
        F: Fn(V) + Sync,
        V: Send,
    {
        let workers = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1)
            .min(self.shards.len());

        if workers <= 1 {
            self.shards.iter().for_each(|shard| shard.cleanup(&visit));
            return;
        }

        let chunk = self.shards.len().div_ceil(workers);
        let visit = &visit;
        thread::scope(|scope| {
            for shards in self.shards.chunks(chunk) {
                scope.spawn(move || shards.iter().for_each(|shard| shard.cleanup(visit)));
            }
        });
    }
}

impl<V> Default for Store<V> {
    fn default() -> Self {
        Self::new()
    }
}
