//! Dimension Cache Module
//!
//! Two-tier cache mapping an image URL to its measured pixel size, so the
//! same remote image is never probed twice across app restarts. Lookup
//! order: memory map, durable blob, network probe.
//!
//! Probe failures resolve to `None` rather than erroring, which keeps batch
//! preloads fault-isolated per URL: one bad link never aborts the batch.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinSet;
use tracing::debug;

use crate::cache::{CacheStats, TieredCache, DIMENSION_CACHE_KEY};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::models::{DimensionEntry, ImageDimensions};
use crate::storage::KvStore;

// == Image Prober Trait ==
/// Asynchronous image-size probe (external collaborator).
///
/// Given a URL, resolves with the image's `(width, height)` in pixels or
/// fails. No timeout is imposed here; implementations rely on the underlying
/// network stack's own timeout behavior.
#[async_trait]
pub trait ImageProber: Send + Sync {
    async fn probe(&self, url: &str) -> Result<(u32, u32)>;
}

// == Dimension Cache ==
/// URL -> measured dimensions cache with a 7-day TTL (configurable).
///
/// Cloning is cheap and produces a handle to the same cache, so a clone can
/// be moved into detached background tasks.
#[derive(Clone)]
pub struct DimensionCache {
    inner: Arc<DimensionCacheInner>,
}

struct DimensionCacheInner {
    /// Memory + durable tiers, keyed by URL
    tier: TieredCache<DimensionEntry>,
    /// Measurement collaborator
    prober: Arc<dyn ImageProber>,
}

impl DimensionCache {
    // == Constructor ==
    /// Creates a dimension cache over `store`, measuring through `prober`.
    pub fn new(
        store: Arc<dyn KvStore>,
        prober: Arc<dyn ImageProber>,
        config: &CacheConfig,
    ) -> Self {
        let tier = TieredCache::new(
            store,
            config.storage_key(DIMENSION_CACHE_KEY),
            config.dimension_ttl_ms,
        );
        Self {
            inner: Arc::new(DimensionCacheInner { tier, prober }),
        }
    }

    // == Get Cached ==
    /// Layered lookup: memory first, then the durable blob (with promotion).
    ///
    /// Returns `None` for absent, expired, or unreadable entries; storage
    /// problems never propagate.
    pub async fn get_cached(&self, url: &str) -> Option<ImageDimensions> {
        self.inner
            .tier
            .get(url)
            .await
            .map(|entry| ImageDimensions::from_entry(url, &entry.value, entry.cached_at))
    }

    // == Get Cached (Sync) ==
    /// Memory-only lookup with no I/O, for synchronous layout paths.
    pub fn get_cached_sync(&self, url: &str) -> Option<ImageDimensions> {
        self.inner
            .tier
            .get_memory(url)
            .map(|entry| ImageDimensions::from_entry(url, &entry.value, entry.cached_at))
    }

    // == Cache Dimensions ==
    /// Records a measurement. The memory map is updated before the durable
    /// write, so an immediate read sees the new value even mid-persist, and
    /// a failed persist does not fail the caller.
    pub async fn cache_dimensions(&self, url: &str, width: u32, height: u32) -> ImageDimensions {
        let entry = self
            .inner
            .tier
            .insert(url, DimensionEntry::new(width, height))
            .await;
        ImageDimensions::from_entry(url, &entry.value, entry.cached_at)
    }

    // == Measure And Cache ==
    /// Returns the cached value if present, otherwise probes the image and
    /// caches the result. Resolves with `None` on probe failure, never errors.
    pub async fn measure_and_cache(&self, url: &str) -> Option<ImageDimensions> {
        if let Some(dims) = self.get_cached(url).await {
            return Some(dims);
        }
        match self.inner.prober.probe(url).await {
            Ok((width, height)) => Some(self.cache_dimensions(url, width, height).await),
            Err(err) => {
                debug!(url, error = %err, "image probe failed, skipping");
                None
            }
        }
    }

    // == Preload ==
    /// Batch entry point called after a feed fetch: measures every not-yet-
    /// cached URL concurrently and waits for all of them to settle.
    /// Individual failures are ignored; short-circuits when everything is
    /// already cached.
    pub async fn preload(&self, urls: &[String]) {
        let mut seen = HashSet::new();
        let mut uncached = Vec::new();
        for url in urls {
            if seen.insert(url.as_str()) && self.get_cached(url).await.is_none() {
                uncached.push(url.clone());
            }
        }
        if uncached.is_empty() {
            return;
        }

        debug!(count = uncached.len(), "preloading image dimensions");
        let mut tasks = JoinSet::new();
        for url in uncached {
            let cache = self.clone();
            tasks.spawn(async move {
                cache.measure_and_cache(&url).await;
            });
        }
        while let Some(result) = tasks.join_next().await {
            if let Err(err) = result {
                debug!(error = %err, "dimension preload task failed");
            }
        }
    }

    // == Sweep Expired ==
    /// Full sweep removing every TTL-expired entry from both tiers.
    /// Intended to run periodically (e.g. app startup), not on every read.
    pub async fn sweep_expired(&self) -> usize {
        self.inner.tier.sweep_expired().await
    }

    // == Clear ==
    /// Drops the memory map and deletes the durable blob.
    pub async fn clear(&self) {
        self.inner.tier.clear().await;
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.inner.tier.stats()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    use crate::error::CacheError;
    use crate::storage::MemoryKvStore;

    /// Probe returning a fixed size, failing for URLs containing "bad".
    struct StubProber {
        calls: AtomicU64,
    }

    impl StubProber {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU64::new(0),
            })
        }

        fn calls(&self) -> u64 {
            self.calls.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl ImageProber for StubProber {
        async fn probe(&self, url: &str) -> Result<(u32, u32)> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            if url.contains("bad") {
                Err(CacheError::Probe(format!("unreachable: {url}")))
            } else {
                Ok((800, 600))
            }
        }
    }

    fn new_cache(store: &MemoryKvStore, prober: Arc<StubProber>) -> DimensionCache {
        DimensionCache::new(
            Arc::new(store.clone()),
            prober,
            &CacheConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_measure_and_cache() {
        let store = MemoryKvStore::new();
        let prober = StubProber::new();
        let cache = new_cache(&store, Arc::clone(&prober));

        let dims = cache.measure_and_cache("https://img/a.jpg").await.unwrap();
        assert_eq!(dims.width, 800);
        assert_eq!(dims.height, 600);
        assert!((dims.aspect_ratio - 800.0 / 600.0).abs() < f64::EPSILON);

        // Cached now: a second call does not probe again
        cache.measure_and_cache("https://img/a.jpg").await.unwrap();
        assert_eq!(prober.calls(), 1);
    }

    #[tokio::test]
    async fn test_probe_failure_resolves_none() {
        let store = MemoryKvStore::new();
        let cache = new_cache(&store, StubProber::new());

        assert!(cache.measure_and_cache("https://img/bad.jpg").await.is_none());
    }

    #[tokio::test]
    async fn test_sync_lookup_requires_memory_residency() {
        let store = MemoryKvStore::new();
        let prober = StubProber::new();

        {
            let writer = new_cache(&store, Arc::clone(&prober));
            writer.cache_dimensions("https://img/a.jpg", 100, 50).await;
        }

        // A fresh instance has an empty memory map
        let reader = new_cache(&store, prober);
        assert!(reader.get_cached_sync("https://img/a.jpg").is_none());

        // Async lookup promotes, after which the sync path sees it
        assert!(reader.get_cached("https://img/a.jpg").await.is_some());
        let dims = reader.get_cached_sync("https://img/a.jpg").unwrap();
        assert_eq!(dims.width, 100);
        assert!((dims.aspect_ratio - 2.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_preload_tolerates_failures() {
        let store = MemoryKvStore::new();
        let prober = StubProber::new();
        let cache = new_cache(&store, Arc::clone(&prober));

        let urls = vec![
            "https://img/a.jpg".to_string(),
            "https://img/bad.jpg".to_string(),
            "https://img/c.jpg".to_string(),
        ];
        cache.preload(&urls).await;

        assert_eq!(prober.calls(), 3);
        assert!(cache.get_cached("https://img/a.jpg").await.is_some());
        assert!(cache.get_cached("https://img/bad.jpg").await.is_none());
        assert!(cache.get_cached("https://img/c.jpg").await.is_some());
    }

    #[tokio::test]
    async fn test_preload_short_circuits_when_all_cached() {
        let store = MemoryKvStore::new();
        let prober = StubProber::new();
        let cache = new_cache(&store, Arc::clone(&prober));

        cache.cache_dimensions("https://img/a.jpg", 10, 10).await;
        cache
            .preload(&["https://img/a.jpg".to_string(), "https://img/a.jpg".to_string()])
            .await;

        assert_eq!(prober.calls(), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_degrades_to_probe() {
        let store = MemoryKvStore::new();
        let prober = StubProber::new();
        let cache = new_cache(&store, Arc::clone(&prober));

        store.set_read_error(Some("storage corrupt".to_string()));
        store.set_write_error(Some("storage corrupt".to_string()));

        // Reads degrade to a miss, so the probe runs and the result lives in
        // memory despite persistence failing
        let dims = cache.measure_and_cache("https://img/a.jpg").await.unwrap();
        assert_eq!(dims.width, 800);
        assert!(cache.get_cached_sync("https://img/a.jpg").is_some());
    }
}
