//! Feed Post Models
//!
//! `FeedPost` is the full post shape as fetched from the backend;
//! `CachedPost` is the reduced projection persisted in the feed snapshot.
//! The projection drops fields that an instant re-render does not need but
//! deliberately keeps the full, untruncated description.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ThumbnailDimensions;

// == Media Type ==
/// Kind of media a post carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Photo,
    Video,
}

// == Post Author ==
/// Denormalized author snapshot embedded in every post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAuthor {
    #[serde(rename = "_id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub profile_picture: Option<String>,
}

// == Reactions ==
/// Aggregate reaction state on a post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reactions {
    /// User ids that liked the post
    pub likes: Vec<String>,
    /// Total view count
    pub total_views: u64,
}

// == Feed Post ==
/// A full feed post as returned by the backend feed endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPost {
    #[serde(rename = "_id")]
    pub id: String,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub photo_url: Option<String>,
    pub duration: Option<f64>,
    pub description: String,
    pub video_url: Option<String>,
    pub media_type: MediaType,
    pub created_at: DateTime<Utc>,
    pub reactions: Reactions,
    pub user: PostAuthor,
    pub comment_count: u32,
    pub is_comments_allowed: bool,
    pub is_pinned: bool,
    // Fields below are served by the backend but dropped by the cache
    // projection.
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tagged_users: Vec<String>,
    #[serde(default)]
    pub is_reported: bool,
}

impl FeedPost {
    /// Collects every image URL this post references (thumbnail, gallery
    /// images, standalone photo), for dimension preloading.
    pub fn image_urls(&self) -> Vec<String> {
        let mut urls = Vec::new();
        if let Some(thumbnail) = &self.thumbnail {
            urls.push(thumbnail.clone());
        }
        urls.extend(self.images.iter().cloned());
        if let Some(photo_url) = &self.photo_url {
            urls.push(photo_url.clone());
        }
        urls
    }
}

// == Cached Post ==
/// The reduced projection of a [`FeedPost`] persisted in the feed snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedPost {
    #[serde(rename = "_id")]
    pub id: String,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub photo_url: Option<String>,
    pub duration: Option<f64>,
    /// Full description text, never truncated
    pub description: String,
    pub video_url: Option<String>,
    pub media_type: MediaType,
    pub created_at: DateTime<Utc>,
    pub reactions: Reactions,
    pub user: PostAuthor,
    pub comment_count: u32,
    pub is_comments_allowed: bool,
    pub is_pinned: bool,
    /// Present only when the thumbnail was already measured at write time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_dimensions: Option<ThumbnailDimensions>,
}

impl CachedPost {
    /// Projects a full post down to the cached shape, attaching pre-measured
    /// thumbnail dimensions when available.
    pub fn from_post(post: &FeedPost, thumbnail_dimensions: Option<ThumbnailDimensions>) -> Self {
        Self {
            id: post.id.clone(),
            thumbnail: post.thumbnail.clone(),
            images: post.images.clone(),
            photo_url: post.photo_url.clone(),
            duration: post.duration,
            description: post.description.clone(),
            video_url: post.video_url.clone(),
            media_type: post.media_type,
            created_at: post.created_at,
            reactions: post.reactions.clone(),
            user: post.user.clone(),
            comment_count: post.comment_count,
            is_comments_allowed: post.is_comments_allowed,
            is_pinned: post.is_pinned,
            thumbnail_dimensions,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post(id: &str) -> FeedPost {
        FeedPost {
            id: id.to_string(),
            thumbnail: Some(format!("https://cdn.example.com/{id}/thumb.jpg")),
            images: vec![format!("https://cdn.example.com/{id}/1.jpg")],
            photo_url: Some(format!("https://cdn.example.com/{id}/photo.jpg")),
            duration: Some(12.5),
            description: "a long description that is never truncated".to_string(),
            video_url: Some(format!("https://cdn.example.com/{id}/video.mp4")),
            media_type: MediaType::Video,
            created_at: Utc::now(),
            reactions: Reactions {
                likes: vec!["u1".to_string()],
                total_views: 7,
            },
            user: PostAuthor {
                id: "author-1".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                username: "ada".to_string(),
                profile_picture: None,
            },
            comment_count: 3,
            is_comments_allowed: true,
            is_pinned: false,
            updated_at: Some(Utc::now()),
            tagged_users: vec!["u2".to_string()],
            is_reported: false,
        }
    }

    #[test]
    fn test_image_urls_collects_all_sources() {
        let post = sample_post("p1");
        let urls = post.image_urls();

        assert_eq!(
            urls,
            vec![
                "https://cdn.example.com/p1/thumb.jpg".to_string(),
                "https://cdn.example.com/p1/1.jpg".to_string(),
                "https://cdn.example.com/p1/photo.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn test_image_urls_skips_absent_sources() {
        let mut post = sample_post("p1");
        post.thumbnail = None;
        post.photo_url = None;
        post.images.clear();

        assert!(post.image_urls().is_empty());
    }

    #[test]
    fn test_projection_keeps_description_and_drops_extras() {
        let post = sample_post("p1");
        let cached = CachedPost::from_post(&post, None);

        assert_eq!(cached.id, "p1");
        assert_eq!(cached.description, post.description);
        assert_eq!(cached.reactions, post.reactions);
        assert!(cached.thumbnail_dimensions.is_none());

        // Dropped fields must not round-trip through the projection
        let json = serde_json::to_value(&cached).unwrap();
        assert!(json.get("updatedAt").is_none());
        assert!(json.get("taggedUsers").is_none());
        assert!(json.get("isReported").is_none());
        // Omitted dimensions leave no key behind
        assert!(json.get("thumbnailDimensions").is_none());
    }

    #[test]
    fn test_projection_attaches_thumbnail_dimensions() {
        let post = sample_post("p1");
        let cached = CachedPost::from_post(
            &post,
            Some(ThumbnailDimensions {
                width: 320,
                height: 180,
            }),
        );

        let dims = cached.thumbnail_dimensions.unwrap();
        assert_eq!(dims.width, 320);
        assert_eq!(dims.height, 180);
    }
}
