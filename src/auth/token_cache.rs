//! Token Cache Module
//!
//! Keeps the active token pair resident in memory so authenticated HTTP
//! calls skip a durable-storage round trip, while durable storage remains
//! the source of truth after login/logout.
//!
//! Unlike the feed/dimension caches this one does NOT fail soft: a storage
//! read failure propagates, because silently treating "can't read token" as
//! "no token" could send requests unauthenticated when they should surface
//! an auth error instead.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use tracing::debug;

use crate::error::Result;
use crate::models::TokenPair;
use crate::storage::KvStore;

// == Storage Keys ==
/// Storage key holding the access token.
pub const ACCESS_TOKEN_KEY: &str = "token";

/// Storage key holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

// == Token Cache ==
/// In-memory cache over the durable token keys.
///
/// Absent values are cached too (`Some(None)` internally), so an
/// unauthenticated process performs exactly one storage read per key until
/// the cache is invalidated.
#[derive(Clone)]
pub struct TokenCache {
    inner: Arc<TokenCacheInner>,
}

struct TokenCacheInner {
    store: Arc<dyn KvStore>,
    memory: Mutex<HashMap<String, Option<String>>>,
}

impl TokenCache {
    // == Constructor ==
    /// Creates a token cache over `store` with an empty memory layer.
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            inner: Arc::new(TokenCacheInner {
                store,
                memory: Mutex::new(HashMap::new()),
            }),
        }
    }

    // == Get Token ==
    /// Returns the in-memory value if present; otherwise performs exactly
    /// one durable read, caches the result (even when absent), and returns
    /// it. Storage errors propagate to the caller as-is.
    pub async fn get_token(&self, key: &str) -> Result<Option<String>> {
        {
            let memory = self.inner.memory.lock().expect("token cache mutex poisoned");
            if let Some(value) = memory.get(key) {
                return Ok(value.clone());
            }
        }

        let value = self.inner.store.get(key).await?;
        self.inner
            .memory
            .lock()
            .expect("token cache mutex poisoned")
            .insert(key.to_string(), value.clone());
        Ok(value)
    }

    // == Token Pair ==
    /// Convenience lookup of both token keys.
    pub async fn token_pair(&self) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.get_token(ACCESS_TOKEN_KEY).await?,
            refresh_token: self.get_token(REFRESH_TOKEN_KEY).await?,
        })
    }

    // == Update Cache ==
    /// Synchronous in-memory write, immediately visible to subsequent
    /// `get_token` calls with no storage round trip. Used right after
    /// login/refresh; durable persistence is the auth flow's responsibility.
    pub fn update_cache(&self, access_token: Option<String>, refresh_token: Option<String>) {
        let mut memory = self.inner.memory.lock().expect("token cache mutex poisoned");
        memory.insert(ACCESS_TOKEN_KEY.to_string(), access_token);
        memory.insert(REFRESH_TOKEN_KEY.to_string(), refresh_token);
    }

    // == Invalidate ==
    /// Clears the memory layer entirely; the next `get_token` re-hits
    /// storage. Used on logout.
    pub fn invalidate(&self) {
        self.inner
            .memory
            .lock()
            .expect("token cache mutex poisoned")
            .clear();
        debug!("token cache invalidated");
    }

    // == Invalidation Handle ==
    /// A weak handle the storage layer can hold to drop the memory copy when
    /// storage is cleared by another part of the app (e.g. a forced logout
    /// elsewhere), so stale tokens are never served.
    pub fn invalidation_handle(&self) -> InvalidationHandle {
        InvalidationHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

// == Invalidation Handle ==
/// Weak invalidation hook registered with the storage layer.
#[derive(Clone)]
pub struct InvalidationHandle {
    inner: Weak<TokenCacheInner>,
}

impl InvalidationHandle {
    /// Drops the cache's memory layer if the cache is still alive.
    pub fn invalidate(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner
                .memory
                .lock()
                .expect("token cache mutex poisoned")
                .clear();
            debug!("token cache invalidated via storage hook");
        }
    }
}
