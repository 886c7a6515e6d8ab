//! Injected caches for resolution results.
//!
//! Caches are a performance optimization only: a miss recomputes the same
//! answer a hit would have returned. Writes of the same key are idempotent,
//! so concurrent duplicate writes are harmless.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::{Mutex, RwLock};
use tracing::debug;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now = add_saturating(*now, by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Key-value cache with per-entry TTL.
pub trait Cache<V>: Send + Sync {
    fn get(&self, key: &str) -> Option<V>;
    fn set(&self, key: &str, value: V, ttl: Duration);
    fn clear(&self);
}

/// Writes between sweeps of expired entries.
pub const PURGE_EVERY: usize = 64;

/// In-process cache backed by a `RwLock<HashMap>`.
///
/// Expired entries are dropped when read and swept every [`PURGE_EVERY`]
/// writes, so keys that are never read again do not accumulate.
pub struct MemoryCache<V> {
    entries: RwLock<HashMap<String, (V, DateTime<Utc>)>>,
    clock: Arc<dyn Clock>,
    writes: AtomicUsize,
}

impl<V: Clone> MemoryCache<V> {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop expired entries. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, (_, expires)| *expires > now);
        before - entries.len()
    }
}

impl<V: Clone> Default for MemoryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + Send + Sync> Cache<V> for MemoryCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some((value, expires)) if *expires > now => {
                    debug!(key, "cache hit");
                    return Some(value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }
        // Re-check under the write lock; another writer may have refreshed it.
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|(_, expires)| *expires <= now) {
            entries.remove(key);
            debug!(key, "evicted expired cache entry");
        }
        None
    }

    fn set(&self, key: &str, value: V, ttl: Duration) {
        let now = self.clock.now();
        let expires = add_saturating(now, ttl);
        let mut entries = self.entries.write();
        if self.writes.fetch_add(1, Ordering::Relaxed) % PURGE_EVERY == PURGE_EVERY - 1 {
            let before = entries.len();
            entries.retain(|_, (_, expires)| *expires > now);
            debug!(removed = before - entries.len(), "swept expired cache entries");
        }
        entries.insert(key.to_string(), (value, expires));
    }

    fn clear(&self) {
        self.entries.write().clear();
    }
}

/// Cache that stores nothing, for callers that disable caching.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl<V> Cache<V> for NoCache {
    fn get(&self, _key: &str) -> Option<V> {
        None
    }

    fn set(&self, _key: &str, _value: V, _ttl: Duration) {}

    fn clear(&self) {}
}

fn add_saturating(at: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(by)
        .ok()
        .and_then(|delta| at.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
