//! Feed Envelope Models
//!
//! The single persisted object bundling the cached post list, its write
//! timestamp, and the current user's interaction state under one storage key.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::CachedPost;

// == User Interactions ==
/// The logged-in user's interaction state, kept alongside the post snapshot.
///
/// Updated independently of the post list: interaction correctness does not
/// depend on post-content freshness, so writes here never bump the envelope
/// timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInteractions {
    /// Post ids the current user liked
    pub likes: Vec<String>,
    /// Post ids the current user bookmarked
    pub bookmarks: Vec<String>,
    /// Post id -> view count
    pub plays_count: HashMap<String, u64>,
}

// == Feed Cache Data ==
/// The feed snapshot envelope persisted as one JSON blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedCacheData {
    /// Most-recently-fetched page, server order, capped at the post limit
    pub posts: Vec<CachedPost>,
    /// When the post list was written (Unix milliseconds)
    pub timestamp: u64,
    /// Interaction state, which may outlive the post TTL
    pub user_interactions: UserInteractions,
}
