use crate::traits::Clock;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    stored_at: DateTime<Utc>,
}

/// A cache hit together with how long ago it was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedValue<V> {
    pub value: V,
    pub age: Duration,
}

/// TTL-bounded snapshot cache shared by read handlers and ingestion passes.
///
/// Entries at or past their TTL are treated as misses and evicted on access.
/// Every invalidation bumps a generation counter; writers that computed their
/// value under an older generation use [`set_if_generation`](Self::set_if_generation)
/// so they can't resurrect a snapshot taken before the invalidation.
pub struct QueryCache<V> {
    entries: RwLock<HashMap<String, Entry<V>>>,
    /// Only bumped while `entries` is write-locked.
    generation: AtomicU64,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone + Send + Sync> QueryCache<V> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, key: &str) -> Option<CachedValue<V>> {
        {
            let entries = self.entries.read().await;
            let now = self.clock.now();
            match entries.get(key) {
                None => return None,
                Some(entry) if now - entry.stored_at < self.ttl => {
                    return Some(Self::hit(entry, now));
                }
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        let now = self.clock.now();
        // Another writer may have refreshed the entry in between.
        if let Some(entry) = entries.get(key) {
            if now - entry.stored_at < self.ttl {
                return Some(Self::hit(entry, now));
            }
            entries.remove(key);
            debug!(key, "Evicted expired cache entry");
        }
        None
    }

    fn hit(entry: &Entry<V>, now: DateTime<Utc>) -> CachedValue<V> {
        CachedValue {
            value: entry.value.clone(),
            age: (now - entry.stored_at).max(Duration::zero()),
        }
    }

    pub async fn set(&self, key: impl Into<String>, value: V) {
        let entry = Entry {
            value,
            stored_at: self.clock.now(),
        };
        self.entries.write().await.insert(key.into(), entry);
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Store `value` only if no invalidation happened since `generation` was read.
    pub async fn set_if_generation(&self, key: impl Into<String>, value: V, generation: u64) -> bool {
        let mut entries = self.entries.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        let entry = Entry {
            value,
            stored_at: self.clock.now(),
        };
        entries.insert(key.into(), entry);
        true
    }

    /// Returns the number of dropped entries.
    pub async fn invalidate_all(&self) -> usize {
        let mut entries = self.entries.write().await;
        let dropped = entries.len();
        entries.clear();
        self.generation.fetch_add(1, Ordering::SeqCst);
        if dropped > 0 {
            debug!(dropped, "Invalidated query cache");
        }
        dropped
    }

    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        self.generation.fetch_add(1, Ordering::SeqCst);
        before - entries.len()
    }

    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| now - entry.stored_at < self.ttl);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
