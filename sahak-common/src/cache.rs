//! Time-bounded memoization keyed by exact inputs.
//!
//! [`TtlCache`] stores the result of a previous computation for a fixed
//! freshness window. There is no size bound and no eviction policy besides
//! the TTL: an entry older than the window is never returned and is dropped
//! on the next lookup or [`TtlCache::purge_expired`].
//!
//! Clones share the same storage, so one cache can be handed to several
//! components of a pipeline.
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use sahak_common::cache::TtlCache;
//! use std::time::Duration;
//!
//! let cache: TtlCache<String, usize> = TtlCache::new("lengths", Duration::from_secs(60));
//! let first = cache.get_or_compute("안중근".to_string(), || async { 3 }).await;
//! let second = cache.get_or_compute("안중근".to_string(), || async { 99 }).await;
//! assert_eq!((first, second), (3, 3));
//! assert_eq!(cache.stats().hits, 1);
//! # }
//! ```

use dashmap::DashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Hit/miss counters for a cache instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

struct Inner<K, V> {
    name: &'static str,
    ttl: Duration,
    entries: DashMap<K, Entry<V>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Get-or-compute cache whose entries expire after a fixed TTL.
pub struct TtlCache<K, V> {
    inner: Arc<Inner<K, V>>,
}

impl<K, V> Clone for TtlCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Eq + Hash, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("name", &self.inner.name)
            .field("ttl", &self.inner.ttl)
            .field("entries", &self.inner.entries.len())
            .finish()
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache. `name` only shows up in logs.
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                ttl,
                entries: DashMap::new(),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Return the cached value if it is still fresh.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let ttl = self.inner.ttl;
        let fresh = self.inner.entries.get(key).and_then(|entry| {
            (now.duration_since(entry.stored_at) < ttl).then(|| entry.value.clone())
        });

        match fresh {
            Some(value) => {
                self.inner.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(cache = self.inner.name, "cache.hit");
                Some(value)
            }
            None => {
                self.inner.misses.fetch_add(1, Ordering::Relaxed);
                self.inner
                    .entries
                    .remove_if(key, |_, entry| now.duration_since(entry.stored_at) >= ttl);
                tracing::debug!(cache = self.inner.name, "cache.miss");
                None
            }
        }
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn insert(&self, key: K, value: V) {
        self.inner.entries.insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Return the fresh cached value or run `compute` and store its output.
    pub async fn get_or_compute<F, Fut>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = compute().await;
        self.insert(key, value.clone());
        value
    }

    /// Like [`TtlCache::get_or_compute`], but only successful outputs are
    /// stored; an `Err` is handed back and the next call computes again.
    pub async fn get_or_try_compute<F, Fut, E>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = compute().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Drop every expired entry and return how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let ttl = self.inner.ttl;
        let before = self.inner.entries.len();
        self.inner
            .entries
            .retain(|_, entry| now.duration_since(entry.stored_at) < ttl);
        before.saturating_sub(self.inner.entries.len())
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    pub fn clear(&self) {
        self.inner.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            entries: self.inner.entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test(start_paused = true)]
    async fn fresh_entry_is_reused() {
        let cache: TtlCache<(String, Option<String>), String> =
            TtlCache::new("replies", Duration::from_secs(3600));
        let calls = AtomicUsize::new(0);
        let key = ("안중근".to_string(), Some("사료".to_string()));

        for _ in 0..3 {
            let got = cache
                .get_or_compute(key.clone(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    "최종 분류: 의열투쟁".to_string()
                })
                .await;
            assert_eq!(got, "최종 분류: 의열투쟁");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 2,
                misses: 1,
                entries: 1
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn key_components_must_match_exactly() {
        let cache: TtlCache<(String, Option<String>), u32> =
            TtlCache::new("replies", Duration::from_secs(60));
        cache.insert(("이광수".into(), None), 1);

        assert_eq!(cache.get(&("이광수".into(), None)), Some(1));
        assert_eq!(cache.get(&("이광수".into(), Some(String::new()))), None);
        assert_eq!(cache.get(&("이광수 ".into(), None)), None);
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache: TtlCache<&'static str, u32> = TtlCache::new("ttl", Duration::from_secs(10));
        cache.insert("김구", 1);

        tokio::time::advance(Duration::from_secs(9)).await;
        assert_eq!(cache.get(&"김구"), Some(1));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get(&"김구"), None);
        assert!(cache.is_empty());

        let recomputed = cache.get_or_compute("김구", || async { 2 }).await;
        assert_eq!(recomputed, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn errors_are_not_memoized() {
        let cache: TtlCache<&'static str, u32> = TtlCache::new("try", Duration::from_secs(60));

        let first: Result<u32, &str> = cache.get_or_try_compute("k", || async { Err("down") }).await;
        assert_eq!(first, Err("down"));
        assert!(cache.is_empty());

        let second: Result<u32, &str> = cache.get_or_try_compute("k", || async { Ok(7) }).await;
        assert_eq!(second, Ok(7));
        assert_eq!(cache.get(&"k"), Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn purge_drops_only_stale_entries() {
        let cache: TtlCache<u8, u8> = TtlCache::new("purge", Duration::from_secs(5));
        cache.insert(1, 1);
        tokio::time::advance(Duration::from_secs(3)).await;
        cache.insert(2, 2);
        tokio::time::advance(Duration::from_secs(3)).await;

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&2), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn clones_share_storage() {
        let cache: TtlCache<u8, u8> = TtlCache::new("shared", Duration::from_secs(5));
        let other = cache.clone();
        other.insert(1, 10);
        assert_eq!(cache.get(&1), Some(10));
    }

    #[tokio::test(start_paused = true)]
    async fn debug_shows_name_and_size() {
        let cache: TtlCache<String, u8> = TtlCache::new("snippets", Duration::from_secs(5));
        cache.insert("최명길".to_string(), 1);
        let shown = format!("{cache:?}");
        assert!(shown.contains("\"snippets\""));
        assert!(shown.contains("entries: 1"));
    }
}
