//! Data Model Module
//!
//! Defines the serialized shapes persisted by the caches: image dimension
//! records, the reduced feed-post projection, the feed envelope, and the
//! auth token pair.

mod dimensions;
mod feed;
mod post;
mod tokens;

pub use dimensions::{DimensionEntry, ImageDimensions, ThumbnailDimensions};
pub use feed::{FeedCacheData, UserInteractions};
pub use post::{CachedPost, FeedPost, MediaType, PostAuthor, Reactions};
pub use tokens::TokenPair;
