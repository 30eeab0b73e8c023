//! Image Dimension Models
//!
//! Measured pixel sizes for remote images, cached so the layout pass never
//! waits on a network probe twice for the same URL.

use serde::{Deserialize, Serialize};

// == Dimension Entry ==
/// The measured size stored in the dimension-cache blob.
///
/// The URL is the blob key and the measurement timestamp lives on the cache
/// entry wrapper, so this carries only the pixel data itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionEntry {
    /// Measured width in pixels
    pub width: u32,
    /// Measured height in pixels
    pub height: u32,
    /// width / height, computed at write time
    pub aspect_ratio: f64,
}

impl DimensionEntry {
    /// Creates an entry from a measurement, computing the aspect ratio.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            aspect_ratio: width as f64 / height as f64,
        }
    }
}

// == Image Dimensions ==
/// A fully resolved dimension record as handed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDimensions {
    /// The image URL this measurement belongs to
    pub url: String,
    /// Measured width in pixels
    pub width: u32,
    /// Measured height in pixels
    pub height: u32,
    /// width / height, computed at write time
    pub aspect_ratio: f64,
    /// When the measurement was cached (Unix milliseconds)
    pub cached_at: u64,
}

impl ImageDimensions {
    /// Assembles a record from its blob key, stored entry and timestamp.
    pub fn from_entry(url: impl Into<String>, entry: &DimensionEntry, cached_at: u64) -> Self {
        Self {
            url: url.into(),
            width: entry.width,
            height: entry.height,
            aspect_ratio: entry.aspect_ratio,
            cached_at,
        }
    }
}

// == Thumbnail Dimensions ==
/// Width/height pair attached to a cached post when the thumbnail has
/// already been measured; omitted from the envelope otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThumbnailDimensions {
    pub width: u32,
    pub height: u32,
}

impl From<&ImageDimensions> for ThumbnailDimensions {
    fn from(dims: &ImageDimensions) -> Self {
        Self {
            width: dims.width,
            height: dims.height,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_aspect_ratio() {
        let entry = DimensionEntry::new(1920, 1080);
        assert_eq!(entry.width, 1920);
        assert_eq!(entry.height, 1080);
        assert!((entry.aspect_ratio - 1920.0 / 1080.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_entry() {
        let entry = DimensionEntry::new(640, 480);
        let dims = ImageDimensions::from_entry("https://cdn.example.com/a.jpg", &entry, 1_700_000_000_000);

        assert_eq!(dims.url, "https://cdn.example.com/a.jpg");
        assert_eq!(dims.width, 640);
        assert_eq!(dims.height, 480);
        assert_eq!(dims.cached_at, 1_700_000_000_000);
    }

    #[test]
    fn test_thumbnail_projection() {
        let entry = DimensionEntry::new(320, 180);
        let dims = ImageDimensions::from_entry("u", &entry, 0);
        let thumb = ThumbnailDimensions::from(&dims);

        assert_eq!(thumb.width, 320);
        assert_eq!(thumb.height, 180);
    }
}
