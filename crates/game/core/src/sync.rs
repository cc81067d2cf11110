//! Thread-safe collection wrapper and lock helpers.
//!
//! Area object sets, subareas, departures and the respawn queue may be touched by
//! loader threads while the simulation thread ticks. They sit behind [`SharedMap`],
//! which only exposes whole-value operations and snapshots; callers iterate a
//! snapshot, never the live map.
//!
//! Entity locks are `std::sync::RwLock`. A poisoned lock is recovered rather than
//! propagated: the simulation keeps advancing other entities.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{
    Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError,
};

/// Acquire a read guard, recovering from poisoning.
pub fn read<T: ?Sized>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

/// Acquire a write guard, recovering from poisoning.
pub fn write<T: ?Sized>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Try to acquire a write guard without blocking.
///
/// Returns `None` when another guard is live, which is how cross-entity writes
/// avoid deadlocking against an entity that is already being updated.
pub fn try_write<T: ?Sized>(lock: &RwLock<T>) -> Option<RwLockWriteGuard<'_, T>> {
    match lock.try_write() {
        Ok(guard) => Some(guard),
        Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
        Err(TryLockError::WouldBlock) => None,
    }
}

/// Try to acquire a read guard without blocking.
pub fn try_read<T: ?Sized>(lock: &RwLock<T>) -> Option<RwLockReadGuard<'_, T>> {
    match lock.try_read() {
        Ok(guard) => Some(guard),
        Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
        Err(TryLockError::WouldBlock) => None,
    }
}

pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mutex-guarded hash map with snapshot iteration.
#[derive(Debug)]
pub struct SharedMap<K, V> {
    inner: Mutex<HashMap<K, V>>,
}

impl<K, V> Default for SharedMap<K, V> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> SharedMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning the previous one under the same key.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        lock(&self.inner).insert(key, value)
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        lock(&self.inner).remove(key)
    }

    pub fn get(&self, key: &K) -> Option<V> {
        lock(&self.inner).get(key).cloned()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        lock(&self.inner).contains_key(key)
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.inner).is_empty()
    }

    /// Copies every entry out of the map.
    pub fn snapshot(&self) -> Vec<(K, V)> {
        lock(&self.inner)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn keys(&self) -> Vec<K> {
        lock(&self.inner).keys().cloned().collect()
    }

    pub fn values(&self) -> Vec<V> {
        lock(&self.inner).values().cloned().collect()
    }

    pub fn clear(&self) {
        lock(&self.inner).clear();
    }

    /// Removes and returns every entry.
    pub fn drain(&self) -> Vec<(K, V)> {
        lock(&self.inner).drain().collect()
    }
}
