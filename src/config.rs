//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;

use crate::cache::{DIMENSION_TTL_MS, FEED_TTL_MS, MAX_CACHED_POSTS};

/// Caching core configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached image dimensions, in milliseconds
    pub dimension_ttl_ms: u64,
    /// TTL for the cached feed snapshot, in milliseconds
    pub feed_ttl_ms: u64,
    /// Maximum number of posts retained in the feed snapshot
    pub max_posts: usize,
    /// Background expired-entry sweep interval in seconds
    pub sweep_interval: u64,
    /// Optional namespace prefixed to every storage key.
    ///
    /// The source app keys its caches globally; multi-account callers can
    /// construct one cache set per account by namespacing with the account id.
    pub namespace: Option<String>,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DIMENSION_TTL_MS` - Dimension cache TTL in ms (default: 7 days)
    /// - `FEED_TTL_MS` - Feed snapshot TTL in ms (default: 24 hours)
    /// - `MAX_FEED_POSTS` - Feed snapshot post cap (default: 10)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 3600)
    /// - `CACHE_NAMESPACE` - Storage key prefix (default: none)
    pub fn from_env() -> Self {
        Self {
            dimension_ttl_ms: env::var("DIMENSION_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DIMENSION_TTL_MS),
            feed_ttl_ms: env::var("FEED_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(FEED_TTL_MS),
            max_posts: env::var("MAX_FEED_POSTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(MAX_CACHED_POSTS),
            sweep_interval: env::var("SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            namespace: env::var("CACHE_NAMESPACE").ok().filter(|v| !v.is_empty()),
        }
    }

    /// Applies the configured namespace (if any) to a storage key.
    pub fn storage_key(&self, key: &str) -> String {
        match &self.namespace {
            Some(ns) => format!("{}:{}", ns, key),
            None => key.to_string(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dimension_ttl_ms: DIMENSION_TTL_MS,
            feed_ttl_ms: FEED_TTL_MS,
            max_posts: MAX_CACHED_POSTS,
            sweep_interval: 3600,
            namespace: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.dimension_ttl_ms, 7 * 24 * 60 * 60 * 1000);
        assert_eq!(config.feed_ttl_ms, 24 * 60 * 60 * 1000);
        assert_eq!(config.max_posts, 10);
        assert_eq!(config.sweep_interval, 3600);
        assert!(config.namespace.is_none());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("DIMENSION_TTL_MS");
        env::remove_var("FEED_TTL_MS");
        env::remove_var("MAX_FEED_POSTS");
        env::remove_var("SWEEP_INTERVAL");
        env::remove_var("CACHE_NAMESPACE");

        let config = CacheConfig::from_env();
        assert_eq!(config.dimension_ttl_ms, DIMENSION_TTL_MS);
        assert_eq!(config.feed_ttl_ms, FEED_TTL_MS);
        assert_eq!(config.max_posts, MAX_CACHED_POSTS);
        assert_eq!(config.sweep_interval, 3600);
    }

    #[test]
    fn test_storage_key_without_namespace() {
        let config = CacheConfig::default();
        assert_eq!(config.storage_key("feed_cache"), "feed_cache");
    }

    #[test]
    fn test_storage_key_with_namespace() {
        let config = CacheConfig {
            namespace: Some("user-42".to_string()),
            ..CacheConfig::default()
        };
        assert_eq!(config.storage_key("feed_cache"), "user-42:feed_cache");
    }
}
