//! Tiered Cache Module
//!
//! Generic two-tier cache: an in-memory map in front of a single durable
//! JSON blob, with per-entry TTL. Lookups are memory-first with
//! promote-on-hit from the durable tier; expired entries are pruned lazily
//! on read and in bulk via [`TieredCache::sweep_expired`].
//!
//! Every durable operation here fails soft: a storage or parse error
//! degrades to "cache miss" on reads and to "memory-only" on writes. The
//! cache is a performance layer, never a correctness dependency.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::CacheStats;
use crate::storage::KvStore;

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

// == Cache Entry ==
/// A cached value together with its write timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// When the value was written (Unix milliseconds)
    pub cached_at: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry timestamped now.
    pub fn new(value: V) -> Self {
        Self {
            value,
            cached_at: current_timestamp_ms(),
        }
    }

    /// Creates an entry with an explicit timestamp.
    pub fn with_timestamp(value: V, cached_at: u64) -> Self {
        Self { value, cached_at }
    }

    // == Is Expired ==
    /// Checks whether the entry's age has reached `ttl_ms`.
    ///
    /// Boundary condition: an entry is expired once its age is greater than
    /// or equal to the TTL, so an entry exactly at the TTL is treated as
    /// absent.
    pub fn is_expired(&self, ttl_ms: u64) -> bool {
        current_timestamp_ms().saturating_sub(self.cached_at) >= ttl_ms
    }
}

// == Soft Storage Helpers ==
/// Reads and parses a JSON value from storage, degrading every failure
/// (storage error, corrupt payload) to `None`.
pub(crate) async fn read_json_soft<T: DeserializeOwned>(
    store: &Arc<dyn KvStore>,
    key: &str,
) -> Option<T> {
    let raw = match store.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!(key, error = %err, "storage read failed, treating as cache miss");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, error = %err, "corrupt cache blob, treating as empty");
            None
        }
    }
}

/// Serializes and writes a JSON value, logging and swallowing failures.
/// After a failed write the memory tier remains the source of truth for the
/// rest of the process lifetime.
pub(crate) async fn write_json_soft<T: Serialize>(store: &Arc<dyn KvStore>, key: &str, value: &T) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(key, error = %err, "failed to serialize cache blob, skipping persist");
            return;
        }
    };
    if let Err(err) = store.set(key, &raw).await {
        warn!(key, error = %err, "storage write failed, keeping in-memory state only");
    }
}

/// Removes a storage key, logging and swallowing failures.
pub(crate) async fn remove_soft(store: &Arc<dyn KvStore>, key: &str) {
    if let Err(err) = store.remove(key).await {
        warn!(key, error = %err, "storage remove failed");
    }
}

// == Tiered Cache ==
/// Two-tier cache over values of type `V`, persisted as one JSON blob
/// (a key -> entry map) under a fixed storage key.
pub struct TieredCache<V> {
    /// Durable tier
    store: Arc<dyn KvStore>,
    /// Storage key owning the durable blob
    storage_key: String,
    /// Per-entry TTL in milliseconds
    ttl_ms: u64,
    /// Memory tier
    memory: Mutex<HashMap<String, CacheEntry<V>>>,
    /// Performance statistics
    stats: Mutex<CacheStats>,
}

impl<V> TieredCache<V>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a tiered cache over `store` with the given blob key and TTL.
    pub fn new(store: Arc<dyn KvStore>, storage_key: impl Into<String>, ttl_ms: u64) -> Self {
        Self {
            store,
            storage_key: storage_key.into(),
            ttl_ms,
            memory: Mutex::new(HashMap::new()),
            stats: Mutex::new(CacheStats::new()),
        }
    }

    // == Get ==
    /// Looks up `key`, memory tier first, then the durable blob.
    ///
    /// A fresh durable hit is promoted into memory so the next lookup does
    /// not touch storage. An expired durable entry is pruned from the blob
    /// and reported as a miss.
    pub async fn get(&self, key: &str) -> Option<CacheEntry<V>> {
        {
            let mut memory = self.memory.lock().expect("cache mutex poisoned");
            if let Some(entry) = memory.get(key) {
                if entry.is_expired(self.ttl_ms) {
                    memory.remove(key);
                    self.record(|s| s.record_eviction());
                } else {
                    let entry = entry.clone();
                    self.record(|s| s.record_hit());
                    return Some(entry);
                }
            }
        }

        let mut blob = match self.read_blob().await {
            Some(blob) => blob,
            None => {
                self.record(|s| s.record_miss());
                return None;
            }
        };

        match blob.get(key) {
            Some(entry) if !entry.is_expired(self.ttl_ms) => {
                let entry = entry.clone();
                // Promotion: memory tier is populated as a side effect
                self.memory
                    .lock()
                    .expect("cache mutex poisoned")
                    .insert(key.to_string(), entry.clone());
                self.record(|s| s.record_hit());
                Some(entry)
            }
            Some(_) => {
                // Lazy prune on read-time expiry
                blob.remove(key);
                self.write_blob(&blob).await;
                self.record(|s| {
                    s.record_eviction();
                    s.record_miss();
                });
                None
            }
            None => {
                self.record(|s| s.record_miss());
                None
            }
        }
    }

    // == Get (Memory Only) ==
    /// Memory-tier lookup with no I/O; returns `None` unless the value is
    /// resident and fresh. For callers that cannot await (e.g. synchronous
    /// layout calculation).
    pub fn get_memory(&self, key: &str) -> Option<CacheEntry<V>> {
        let memory = self.memory.lock().expect("cache mutex poisoned");
        memory
            .get(key)
            .filter(|entry| !entry.is_expired(self.ttl_ms))
            .cloned()
    }

    // == Insert ==
    /// Writes `value` under `key`, memory tier first so a read that races
    /// the durable write already sees the new value. The durable
    /// read-modify-write failing does not fail the caller.
    pub async fn insert(&self, key: &str, value: V) -> CacheEntry<V> {
        let entry = CacheEntry::new(value);
        self.memory
            .lock()
            .expect("cache mutex poisoned")
            .insert(key.to_string(), entry.clone());

        let mut blob = self.read_blob().await.unwrap_or_default();
        blob.insert(key.to_string(), entry.clone());
        self.write_blob(&blob).await;
        entry
    }

    // == Remove ==
    /// Removes `key` from both tiers.
    pub async fn remove(&self, key: &str) {
        self.memory
            .lock()
            .expect("cache mutex poisoned")
            .remove(key);
        if let Some(mut blob) = self.read_blob().await {
            if blob.remove(key).is_some() {
                self.write_blob(&blob).await;
            }
        }
    }

    // == Sweep Expired ==
    /// Removes every TTL-expired entry from both tiers in one pass.
    ///
    /// Returns the number of entries removed from the durable blob.
    pub async fn sweep_expired(&self) -> usize {
        {
            let mut memory = self.memory.lock().expect("cache mutex poisoned");
            let before = memory.len();
            memory.retain(|_, entry| !entry.is_expired(self.ttl_ms));
            let evicted = before - memory.len();
            if evicted > 0 {
                let mut stats = self.stats.lock().expect("stats mutex poisoned");
                for _ in 0..evicted {
                    stats.record_eviction();
                }
            }
        }

        let Some(mut blob) = self.read_blob().await else {
            return 0;
        };
        let before = blob.len();
        blob.retain(|_, entry| !entry.is_expired(self.ttl_ms));
        let removed = before - blob.len();
        if removed > 0 {
            self.write_blob(&blob).await;
            debug!(key = %self.storage_key, removed, "swept expired cache entries");
        }
        removed
    }

    // == Clear ==
    /// Drops the memory tier and deletes the durable blob.
    pub async fn clear(&self) {
        self.memory.lock().expect("cache mutex poisoned").clear();
        remove_soft(&self.store, &self.storage_key).await;
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.lock().expect("stats mutex poisoned").clone();
        stats.set_total_entries(self.memory.lock().expect("cache mutex poisoned").len());
        stats
    }

    fn record(&self, f: impl FnOnce(&mut CacheStats)) {
        f(&mut self.stats.lock().expect("stats mutex poisoned"));
    }

    async fn read_blob(&self) -> Option<HashMap<String, CacheEntry<V>>> {
        read_json_soft(&self.store, &self.storage_key).await
    }

    async fn write_blob(&self, blob: &HashMap<String, CacheEntry<V>>) {
        write_json_soft(&self.store, &self.storage_key, blob).await;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKvStore;

    fn new_cache(store: &MemoryKvStore, ttl_ms: u64) -> TieredCache<String> {
        TieredCache::new(Arc::new(store.clone()), "test_blob", ttl_ms)
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = MemoryKvStore::new();
        let cache = new_cache(&store, 60_000);

        cache.insert("key1", "value1".to_string()).await;
        let entry = cache.get("key1").await.unwrap();

        assert_eq!(entry.value, "value1");
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = MemoryKvStore::new();
        let cache = new_cache(&store, 60_000);

        assert!(cache.get("missing").await.is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test]
    async fn test_memory_updated_before_durable_write() {
        let store = MemoryKvStore::new();
        let cache = new_cache(&store, 60_000);

        // Durable writes fail, yet the memory tier keeps serving the value
        store.set_write_error(Some("quota exceeded".to_string()));
        cache.insert("key1", "value1".to_string()).await;
        assert_eq!(cache.get_memory("key1").unwrap().value, "value1");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_durable_hit_promotes_to_memory() {
        let store = MemoryKvStore::new();

        // Write through one cache instance, read through a fresh one
        let writer = new_cache(&store, 60_000);
        writer.insert("key1", "value1".to_string()).await;

        let reader = new_cache(&store, 60_000);
        assert!(reader.get_memory("key1").is_none());

        let gets_before = store.get_calls();
        assert_eq!(reader.get("key1").await.unwrap().value, "value1");
        assert!(store.get_calls() > gets_before);

        // Promoted: second read is served from memory without storage I/O
        let gets_after = store.get_calls();
        assert_eq!(reader.get("key1").await.unwrap().value, "value1");
        assert_eq!(store.get_calls(), gets_after);
    }

    #[tokio::test]
    async fn test_expired_entry_pruned_on_read() {
        let store = MemoryKvStore::new();
        let writer = new_cache(&store, 60_000);
        writer.insert("stale", "value".to_string()).await;

        // Rewrite the blob with an ancient timestamp
        let mut blob: HashMap<String, CacheEntry<String>> =
            read_json_soft(&(Arc::new(store.clone()) as Arc<dyn KvStore>), "test_blob")
                .await
                .unwrap();
        blob.get_mut("stale").unwrap().cached_at = 0;
        store.seed("test_blob", serde_json::to_string(&blob).unwrap());

        let reader = new_cache(&store, 60_000);
        assert!(reader.get("stale").await.is_none());

        // The entry was removed from the durable blob on that read
        let blob: HashMap<String, CacheEntry<String>> =
            read_json_soft(&(Arc::new(store.clone()) as Arc<dyn KvStore>), "test_blob")
                .await
                .unwrap();
        assert!(blob.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_blob_is_a_miss() {
        let store = MemoryKvStore::new();
        store.seed("test_blob", "not json {{{");

        let cache = new_cache(&store, 60_000);
        assert!(cache.get("key1").await.is_none());
    }

    #[tokio::test]
    async fn test_storage_error_is_a_miss() {
        let store = MemoryKvStore::new();
        store.set_read_error(Some("quota exceeded".to_string()));

        let cache = new_cache(&store, 60_000);
        assert!(cache.get("key1").await.is_none());
    }

    #[tokio::test]
    async fn test_sweep_expired() {
        let store = MemoryKvStore::new();
        let cache = new_cache(&store, 60_000);
        cache.insert("fresh", "value".to_string()).await;
        cache.insert("stale", "value".to_string()).await;

        // Age one entry past the TTL
        let mut blob: HashMap<String, CacheEntry<String>> =
            read_json_soft(&(Arc::new(store.clone()) as Arc<dyn KvStore>), "test_blob")
                .await
                .unwrap();
        blob.get_mut("stale").unwrap().cached_at = 0;
        store.seed("test_blob", serde_json::to_string(&blob).unwrap());
        // Mirror the aged timestamp in the memory tier
        {
            let mut memory = cache.memory.lock().unwrap();
            memory.get_mut("stale").unwrap().cached_at = 0;
        }

        let removed = cache.sweep_expired().await;
        assert_eq!(removed, 1);
        assert!(cache.get_memory("stale").is_none());
        assert!(cache.get("fresh").await.is_some());
    }

    #[tokio::test]
    async fn test_remove() {
        let store = MemoryKvStore::new();
        let cache = new_cache(&store, 60_000);
        cache.insert("key1", "value1".to_string()).await;

        cache.remove("key1").await;

        assert!(cache.get("key1").await.is_none());
    }

    #[tokio::test]
    async fn test_clear_deletes_durable_key() {
        let store = MemoryKvStore::new();
        let cache = new_cache(&store, 60_000);
        cache.insert("key1", "value1".to_string()).await;

        cache.clear().await;

        assert!(store.is_empty());
        assert!(cache.get_memory("key1").is_none());
    }

    #[test]
    fn test_entry_expiry_boundary() {
        let entry = CacheEntry::with_timestamp("v", current_timestamp_ms());
        assert!(entry.is_expired(0), "entry exactly at the TTL is expired");
        assert!(!entry.is_expired(60_000));
    }
}
