//! Feed Cache Module
//!
//! Bounded snapshot cache for the most recent feed page, so the feed screen
//! renders instantly from the previous snapshot while a fresh network fetch
//! is in flight. Not an offline store: one fixed-size snapshot (10 posts,
//! 24-hour TTL), fully replaced on every write.
//!
//! User interaction state (likes, bookmarks, view counts) lives in the same
//! envelope but is updated independently of the post list and deliberately
//! does not bump the snapshot timestamp.

use std::sync::Arc;

use tracing::debug;

use crate::cache::tiered::{current_timestamp_ms, read_json_soft, remove_soft, write_json_soft};
use crate::cache::{DimensionCache, FEED_CACHE_KEY};
use crate::config::CacheConfig;
use crate::models::{CachedPost, FeedCacheData, FeedPost, ThumbnailDimensions, UserInteractions};
use crate::storage::KvStore;

// == Feed Cache ==
/// Single-envelope feed snapshot cache.
///
/// Cloning is cheap and produces a handle to the same cache.
#[derive(Clone)]
pub struct FeedCache {
    inner: Arc<FeedCacheInner>,
}

struct FeedCacheInner {
    /// Durable tier holding the envelope blob
    store: Arc<dyn KvStore>,
    /// Dimension cache used to enrich cached posts with thumbnail sizes
    dimensions: DimensionCache,
    /// Storage key owning the envelope
    storage_key: String,
    /// Snapshot TTL in milliseconds
    ttl_ms: u64,
    /// Post cap
    max_posts: usize,
}

impl FeedCache {
    // == Constructor ==
    /// Creates a feed cache over `store`, enriching posts through `dimensions`.
    pub fn new(store: Arc<dyn KvStore>, dimensions: DimensionCache, config: &CacheConfig) -> Self {
        Self {
            inner: Arc::new(FeedCacheInner {
                store,
                dimensions,
                storage_key: config.storage_key(FEED_CACHE_KEY),
                ttl_ms: config.feed_ttl_ms,
                max_posts: config.max_posts,
            }),
        }
    }

    // == Get Cached Feed ==
    /// Reads the snapshot envelope, or `None` if absent, unreadable, or
    /// older than the TTL. An expired snapshot is proactively cleared so
    /// stale content is never handed back on a later read either.
    pub async fn get_cached_feed(&self) -> Option<FeedCacheData> {
        let envelope: FeedCacheData =
            read_json_soft(&self.inner.store, &self.inner.storage_key).await?;
        let age = current_timestamp_ms().saturating_sub(envelope.timestamp);
        if age >= self.inner.ttl_ms {
            debug!("feed snapshot expired, clearing");
            self.clear().await;
            return None;
        }
        Some(envelope)
    }

    // == Cache Feed ==
    /// Replaces the snapshot with the first `max_posts` of `posts`.
    ///
    /// Fires dimension preloading for every referenced image URL as a
    /// detached background task; the snapshot write never waits on image
    /// measurement, so posts whose thumbnails were not yet measured are
    /// persisted without `thumbnail_dimensions` (eventual consistency by
    /// design). Already-measured thumbnails are attached from the cache.
    pub async fn cache_feed(&self, posts: &[FeedPost], interactions: Option<UserInteractions>) {
        let capped = &posts[..posts.len().min(self.inner.max_posts)];

        let urls: Vec<String> = capped.iter().flat_map(FeedPost::image_urls).collect();
        if !urls.is_empty() {
            let dimensions = self.inner.dimensions.clone();
            tokio::spawn(async move {
                dimensions.preload(&urls).await;
            });
        }

        let mut cached_posts = Vec::with_capacity(capped.len());
        for post in capped {
            let thumbnail_dimensions = match &post.thumbnail {
                Some(url) => self
                    .inner
                    .dimensions
                    .get_cached(url)
                    .await
                    .map(|dims| ThumbnailDimensions::from(&dims)),
                None => None,
            };
            cached_posts.push(CachedPost::from_post(post, thumbnail_dimensions));
        }

        let envelope = FeedCacheData {
            posts: cached_posts,
            timestamp: current_timestamp_ms(),
            user_interactions: interactions.unwrap_or_default(),
        };
        write_json_soft(&self.inner.store, &self.inner.storage_key, &envelope).await;
    }

    // == Update User Interactions ==
    /// Replaces only the interaction state in the current envelope; the
    /// snapshot timestamp is left untouched since interaction correctness is
    /// independent of post-content staleness. No-ops when no envelope exists.
    ///
    /// Read-modify-write with no lock: two concurrent updates race and the
    /// second write wins, silently discarding the first's changes.
    pub async fn update_interactions(&self, interactions: UserInteractions) {
        let Some(mut envelope) =
            read_json_soft::<FeedCacheData>(&self.inner.store, &self.inner.storage_key).await
        else {
            return;
        };
        envelope.user_interactions = interactions;
        write_json_soft(&self.inner.store, &self.inner.storage_key, &envelope).await;
    }

    // == Clear ==
    /// Deletes the durable envelope outright.
    pub async fn clear(&self) {
        remove_soft(&self.inner.store, &self.inner.storage_key).await;
    }

    // == Is Valid ==
    /// True when a non-expired snapshot exists.
    pub async fn is_valid(&self) -> bool {
        self.get_cached_feed().await.is_some()
    }

    // == Projections ==
    /// The cached post list, or empty when no valid snapshot exists.
    pub async fn cached_posts(&self) -> Vec<CachedPost> {
        self.get_cached_feed()
            .await
            .map(|envelope| envelope.posts)
            .unwrap_or_default()
    }

    /// The cached interaction state, or empty when no valid snapshot exists.
    pub async fn cached_interactions(&self) -> UserInteractions {
        self.get_cached_feed()
            .await
            .map(|envelope| envelope.user_interactions)
            .unwrap_or_default()
    }
}
