//! In-Memory KV Store
//!
//! Reference [`KvStore`] implementation backed by a shared HashMap.
//!
//! Used as the storage backend in tests and anywhere a durable platform
//! store is unavailable. Carries operation counters and an injectable read
//! failure so tests can assert promotion behavior (a second read must not
//! touch storage) and error propagation from token reads.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{CacheError, Result};
use crate::storage::KvStore;

type ClearHook = Box<dyn Fn() + Send + Sync>;

// == Memory KV Store ==
/// Shared in-process key-value store.
///
/// Cloning produces a handle to the same underlying map, so one store can
/// back several caches at once.
#[derive(Clone, Default)]
pub struct MemoryKvStore {
    inner: Arc<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    entries: Mutex<HashMap<String, String>>,
    get_calls: AtomicU64,
    set_calls: AtomicU64,
    remove_calls: AtomicU64,
    /// When set, every read fails with this message
    read_error: Mutex<Option<String>>,
    /// When set, every write fails with this message
    write_error: Mutex<Option<String>>,
    /// Callbacks invoked when the store is cleared externally
    clear_hooks: Mutex<Vec<ClearHook>>,
}

impl MemoryKvStore {
    // == Constructor ==
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Seed ==
    /// Inserts a value directly, bypassing counters. Intended for test setup.
    pub fn seed(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner
            .entries
            .lock()
            .expect("store mutex poisoned")
            .insert(key.into(), value.into());
    }

    // == Clear ==
    /// Wipes every entry and notifies registered clear hooks.
    ///
    /// Models the host app clearing storage out from under the caches (e.g. a
    /// forced logout elsewhere); hooks let in-memory caches drop their copies
    /// instead of serving stale data.
    pub fn clear(&self) {
        self.inner
            .entries
            .lock()
            .expect("store mutex poisoned")
            .clear();
        let hooks = self.inner.clear_hooks.lock().expect("store mutex poisoned");
        for hook in hooks.iter() {
            hook();
        }
    }

    // == Register Clear Hook ==
    /// Registers a callback to run whenever [`clear`](Self::clear) is called.
    pub fn register_clear_hook(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.inner
            .clear_hooks
            .lock()
            .expect("store mutex poisoned")
            .push(Box::new(hook));
    }

    // == Failure Injection ==
    /// Makes every subsequent read fail with `message`; `None` restores reads.
    pub fn set_read_error(&self, message: Option<String>) {
        *self.inner.read_error.lock().expect("store mutex poisoned") = message;
    }

    /// Makes every subsequent write fail with `message`; `None` restores writes.
    pub fn set_write_error(&self, message: Option<String>) {
        *self.inner.write_error.lock().expect("store mutex poisoned") = message;
    }

    // == Counters ==
    /// Number of `get` calls observed.
    pub fn get_calls(&self) -> u64 {
        self.inner.get_calls.load(Ordering::Relaxed)
    }

    /// Number of `set` calls observed.
    pub fn set_calls(&self) -> u64 {
        self.inner.set_calls.load(Ordering::Relaxed)
    }

    /// Number of `remove` calls observed.
    pub fn remove_calls(&self) -> u64 {
        self.inner.remove_calls.load(Ordering::Relaxed)
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.inner
            .entries
            .lock()
            .expect("store mutex poisoned")
            .len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get_calls.fetch_add(1, Ordering::Relaxed);
        if let Some(message) = self
            .inner
            .read_error
            .lock()
            .expect("store mutex poisoned")
            .clone()
        {
            return Err(CacheError::Storage(message));
        }
        Ok(self
            .inner
            .entries
            .lock()
            .expect("store mutex poisoned")
            .get(key)
            .cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set_calls.fetch_add(1, Ordering::Relaxed);
        if let Some(message) = self
            .inner
            .write_error
            .lock()
            .expect("store mutex poisoned")
            .clone()
        {
            return Err(CacheError::Storage(message));
        }
        self.inner
            .entries
            .lock()
            .expect("store mutex poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove_calls.fetch_add(1, Ordering::Relaxed);
        self.inner
            .entries
            .lock()
            .expect("store mutex poisoned")
            .remove(key);
        Ok(())
    }
}
