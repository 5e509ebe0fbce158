//! In-memory TTL caches
//!
//! Two shapes cover every cache the aggregator needs: [`TtlCache`] is a
//! keyed store used for per-item entries, and [`TtlCell`] is a single
//! shared slot used for the id index and the materialized search prefix.
//!
//! Entries are immutable once stored and expiry is evaluated lazily at
//! read time, so no background sweeper is required; an expired entry is
//! reported as a miss and the caller re-populates it. Same-key races after
//! a miss are last-writer-wins, which is acceptable because every cached
//! value is an idempotent function of its key.
//!
//! Both caches take a [`Clock`] so tests can drive expiry deterministically.

use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Time source for cache expiry
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

/// Wall-clock time, used outside of tests
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> Entry<V> {
    fn fresh(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Keyed key/value store with a single fixed TTL
///
/// Backed by a sharded map, so reads and writes on independent keys do not
/// contend on a global lock.
pub struct TtlCache<K, V> {
    entries: DashMap<K, Entry<V>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    /// Look up a key; an expired entry counts as a miss and is dropped.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();

        if let Some(entry) = self.entries.get(key) {
            if entry.fresh(now) {
                return Some(entry.value.clone());
            }
        }

        // Only evict the entry that was actually seen expired, so a
        // concurrent fresh insert is never removed.
        self.entries.remove_if(key, |_, entry| !entry.fresh(now));
        None
    }

    pub fn insert(&self, key: K, value: V) {
        let expires_at = self.clock.now() + self.ttl;
        self.entries.insert(key, Entry { value, expires_at });
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Single shared slot with a fixed TTL
///
/// One value for all callers: concurrent readers share the same cached
/// aggregate rather than computing one each.
pub struct TtlCell<V> {
    slot: RwLock<Option<Entry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V> TtlCell<V>
where
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: RwLock::new(None),
            ttl,
            clock,
        }
    }

    pub async fn get(&self) -> Option<V> {
        let now = self.clock.now();
        let slot = self.slot.read().await;
        match slot.as_ref() {
            Some(entry) if entry.fresh(now) => Some(entry.value.clone()),
            _ => None,
        }
    }

    pub async fn set(&self, value: V) {
        let expires_at = self.clock.now() + self.ttl;
        let mut slot = self.slot.write().await;
        *slot = Some(Entry { value, expires_at });
    }
}

/// Manually advanced clock for deterministic expiry in tests
#[cfg(test)]
pub struct ManualClock {
    now: std::sync::Mutex<Instant>,
}

#[cfg(test)]
impl ManualClock {
    pub fn starting_now() -> Arc<Self> {
        Arc::new(Self {
            now: std::sync::Mutex::new(Instant::now()),
        })
    }

    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += duration;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }
}
