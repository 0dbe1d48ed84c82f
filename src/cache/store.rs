//! TTL response cache.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use bytes::Bytes;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::cache::key::extends_prefix;
use crate::observability::metrics;

/// A cached value and its expiry.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    /// Fresh while `now <= expires_at`.
    pub fn is_fresh(&self, now: Instant) -> bool {
        now <= self.expires_at
    }
}

/// Concurrent key → value cache with per-entry TTL.
///
/// Clones share the same store. Expired entries are dropped lazily on `get`
/// and in bulk by `cleanup`.
///
/// Every removal bumps a generation counter. A reader that captured the
/// generation before fetching can use `set_if_current` so a response that
/// raced an invalidation never lands in the cache.
#[derive(Debug, Clone)]
pub struct ResponseCache<V = Bytes> {
    inner: Arc<DashMap<String, CacheEntry<V>>>,
    generation: Arc<AtomicU64>,
    default_ttl: Duration,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            generation: Arc::new(AtomicU64::new(0)),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Current invalidation generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Fresh value for `key`, or `None` on a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        // The guard must be released before `remove_if` touches the same shard.
        let found = self
            .inner
            .get(key)
            .map(|entry| (entry.is_fresh(now), entry.value.clone()));

        match found {
            Some((true, value)) => Some(value),
            Some((false, _)) => {
                self.inner.remove_if(key, |_, entry| !entry.is_fresh(now));
                None
            }
            None => None,
        }
    }

    /// Insert or overwrite with `expires_at = now + ttl`.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.inner.insert(key.into(), CacheEntry { value, expires_at });
        metrics::record_cache_size(self.inner.len());
    }

    /// Like `set`, but only keeps the entry if nothing was invalidated since
    /// `since` was read from `generation`. Returns whether the entry stayed.
    pub fn set_if_current(
        &self,
        key: impl Into<String>,
        value: V,
        ttl: Duration,
        since: u64,
    ) -> bool {
        let key = key.into();
        if self.generation() != since {
            return false;
        }
        self.set(key.clone(), value, ttl);
        // An invalidation may have scanned the map before the insert above
        if self.generation() != since {
            self.inner.remove(&key);
            return false;
        }
        true
    }

    /// Insert with the default TTL.
    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.set(key, value, self.default_ttl);
    }

    /// Remove one exact key.
    pub fn delete(&self, key: &str) -> bool {
        self.bump_generation();
        self.inner.remove(key).is_some()
    }

    /// Remove `key_or_prefix` and every key extending it at a `/` or `?`
    /// boundary. Returns the number of entries removed.
    pub fn invalidate(&self, key_or_prefix: &str) -> usize {
        self.remove_where(|key| extends_prefix(key, key_or_prefix))
    }

    /// Remove every key containing `pattern`.
    pub fn invalidate_matching(&self, pattern: &str) -> usize {
        self.remove_where(|key| key.contains(pattern))
    }

    fn remove_where(&self, matches: impl Fn(&str) -> bool) -> usize {
        self.bump_generation();
        let doomed: Vec<String> = self
            .inner
            .iter()
            .filter(|entry| matches(entry.key()))
            .map(|entry| entry.key().clone())
            .collect();

        let removed = doomed
            .iter()
            .filter(|key| self.inner.remove(key.as_str()).is_some())
            .count();

        if removed > 0 {
            metrics::record_cache_invalidation(removed);
            metrics::record_cache_size(self.inner.len());
        }
        removed
    }

    pub fn clear(&self) {
        self.bump_generation();
        self.inner.clear();
        metrics::record_cache_size(0);
    }

    /// Drop every expired entry. Returns the number removed.
    pub fn cleanup(&self) -> usize {
        sweep(&self.inner)
    }

    /// Entries currently stored, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<V: Clone + Send + Sync + 'static> ResponseCache<V> {
    /// Sweep expired entries every `period` until the last clone is dropped.
    pub fn spawn_cleanup(&self, period: Duration) -> JoinHandle<()> {
        let weak: Weak<DashMap<String, CacheEntry<V>>> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(map) = weak.upgrade() else {
                    tracing::debug!("Cache dropped, stopping cleanup task");
                    break;
                };
                let removed = sweep(&map);
                if removed > 0 {
                    tracing::debug!(removed, remaining = map.len(), "Swept expired cache entries");
                }
            }
        })
    }
}

fn sweep<V>(map: &DashMap<String, CacheEntry<V>>) -> usize {
    let now = Instant::now();
    let before = map.len();
    map.retain(|_, entry| entry.is_fresh(now));
    let after = map.len();
    metrics::record_cache_size(after);
    before.saturating_sub(after)
}
