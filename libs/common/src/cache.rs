//! In-process response cache
//!
//! Snapshots of read responses are stored per (user, logical endpoint) so one
//! user's data can never be served to another. Entries expire after a fixed
//! TTL, but writers are expected to call [`ResponseCache::invalidate`] for
//! every endpoint their write affects; the TTL only bounds the damage of a
//! missed invalidation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Default lifetime of a cached response (5 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Cache key: the owning user and the logical endpoint name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub user_id: i64,
    pub endpoint: &'static str,
}

impl CacheKey {
    pub fn new(user_id: i64, endpoint: &'static str) -> Self {
        Self { user_id, endpoint }
    }
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// Shared TTL cache handle; clones point at the same storage
#[derive(Debug)]
pub struct ResponseCache<V> {
    ttl: Duration,
    entries: Arc<Mutex<HashMap<CacheKey, CacheEntry<V>>>>,
}

impl<V> Clone for ResponseCache<V> {
    fn clone(&self) -> Self {
        Self {
            ttl: self.ttl,
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<V: Clone> ResponseCache<V> {
    /// Create an empty cache whose entries stay fresh for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value if present and no older than the TTL.
    ///
    /// A stale entry is removed on the way out.
    pub async fn get(&self, user_id: i64, endpoint: &'static str) -> Option<V> {
        let key = CacheKey::new(user_id, endpoint);
        let mut entries = self.entries.lock().await;

        let fresh = match entries.get(&key) {
            Some(entry) => entry.stored_at.elapsed() <= self.ttl,
            None => {
                debug!("Cache miss for user {} on {}", user_id, endpoint);
                return None;
            }
        };

        if fresh {
            debug!("Cache hit for user {} on {}", user_id, endpoint);
            entries.get(&key).map(|entry| entry.value.clone())
        } else {
            debug!("Evicting stale cache entry for user {} on {}", user_id, endpoint);
            entries.remove(&key);
            None
        }
    }

    /// Store `value`, replacing any previous entry for the key
    pub async fn set(&self, user_id: i64, endpoint: &'static str, value: V) {
        let entry = CacheEntry {
            value,
            stored_at: Instant::now(),
        };
        self.entries
            .lock()
            .await
            .insert(CacheKey::new(user_id, endpoint), entry);
    }

    /// Drop the entry for the key; no-op when absent
    pub async fn invalidate(&self, user_id: i64, endpoint: &'static str) {
        if self
            .entries
            .lock()
            .await
            .remove(&CacheKey::new(user_id, endpoint))
            .is_some()
        {
            debug!("Invalidated cache for user {} on {}", user_id, endpoint);
        }
    }

    /// Remove every stale entry and return how many were dropped
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.stored_at.elapsed() <= ttl);
        before - entries.len()
    }

    /// Number of stored entries, fresh or not
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<V: Clone> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
