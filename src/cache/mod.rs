//! Cache Module
//!
//! Two-tier (memory + durable storage) caching with TTL expiration:
//! a generic tiered primitive, the image dimension cache built on it, and
//! the single-snapshot feed cache.

mod dimensions;
mod feed;
mod stats;
mod tiered;


// Re-export public types
pub use dimensions::{DimensionCache, ImageProber};
pub use feed::FeedCache;
pub use stats::CacheStats;
pub use tiered::{current_timestamp_ms, CacheEntry, TieredCache};

// == Public Constants ==
/// TTL for cached image dimensions: 7 days
pub const DIMENSION_TTL_MS: u64 = 7 * 24 * 60 * 60 * 1000;

/// TTL for the cached feed snapshot: 24 hours
pub const FEED_TTL_MS: u64 = 24 * 60 * 60 * 1000;

/// Maximum number of posts retained in the feed snapshot
pub const MAX_CACHED_POSTS: usize = 10;

/// Storage key for the dimension-cache blob
pub const DIMENSION_CACHE_KEY: &str = "image_dimensions_cache";

/// Storage key for the feed snapshot envelope
pub const FEED_CACHE_KEY: &str = "feed_cache";
