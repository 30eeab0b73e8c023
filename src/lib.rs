//! Feedcache - client-side feed/image caching core
//!
//! Two-tier (memory + durable storage) caching for feed snapshots and image
//! dimensions with TTL expiration, plus a token cache with single-flight
//! coalesced refresh.
//!
//! Each cache is an explicit instance constructed once at startup from a
//! [`CacheConfig`] and the platform's durable [`KvStore`], then passed by
//! handle (cheap clones) to consumers.

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod tasks;

pub use auth::{InvalidationHandle, SingleFlight, TokenCache, TokenRefreshCoordinator, TokenRefresher};
pub use cache::{CacheStats, DimensionCache, FeedCache, ImageProber};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use storage::{KvStore, MemoryKvStore};
pub use tasks::spawn_sweep_task;
