//! Video document types for the registry store.
//!
//! This module defines the document structure that is written to the store
//! for every video picked up by the discovery loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Document representation of an ingested video.
///
/// Only the projected subset of the catalog's video resource is kept; every
/// other upstream field is discarded before the document is built.
///
/// # Fields
///
/// - `id`: External video identifier, also used as the store's document key
/// - `kind`: Catalog resource kind (e.g. `youtube#video`)
/// - `published_at`: Publication timestamp, copied verbatim from the catalog
/// - `title`: Video title (searchable)
/// - `description`: Video description (searchable)
/// - `thumbnail_url`: URL of the default thumbnail
/// - `channel_title`: Title of the publishing channel
/// - `created_at`: Ingestion time in epoch milliseconds, set once at write time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoDocument {
    pub id: String,
    pub kind: String,
    pub published_at: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub channel_title: String,
    #[serde(default)]
    pub created_at: i64,
}

impl VideoDocument {
    /// Create a new document that has not been written yet.
    ///
    /// `created_at` stays `0` until the store gateway stamps it.
    ///
    /// # Example
    ///
    /// ```
    /// use video_registry_shared::VideoDocument;
    ///
    /// let doc = VideoDocument::new(
    ///     "dQw4w9WgXcQ",
    ///     "youtube#video",
    ///     "2021-06-01T10:00:00Z",
    ///     "Match highlights",
    ///     "All the goals",
    ///     "https://i.ytimg.com/vi/dQw4w9WgXcQ/default.jpg",
    ///     "Football Channel",
    /// );
    /// assert_eq!(doc.created_at, 0);
    /// ```
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        kind: impl Into<String>,
        published_at: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        thumbnail_url: impl Into<String>,
        channel_title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            published_at: published_at.into(),
            title: title.into(),
            description: description.into(),
            thumbnail_url: thumbnail_url.into(),
            channel_title: channel_title.into(),
            created_at: 0,
        }
    }

    /// The document key used in the store.
    pub fn document_id(&self) -> &str {
        &self.id
    }

    /// Return a copy stamped with the given ingestion time.
    ///
    /// A document that already carries a `created_at` keeps it.
    pub fn stamped(&self, at: DateTime<Utc>) -> Self {
        let mut doc = self.clone();
        if doc.created_at == 0 {
            doc.created_at = at.timestamp_millis();
        }
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> VideoDocument {
        VideoDocument::new(
            "abc123",
            "youtube#video",
            "2021-06-01T10:00:00Z",
            "Title",
            "Description",
            "https://example.com/t.jpg",
            "Channel",
        )
    }

    #[test]
    fn test_document_id_is_video_id() {
        assert_eq!(sample().document_id(), "abc123");
    }

    #[test]
    fn test_stamped_sets_created_at_once() {
        let first = Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2021, 6, 2, 12, 0, 0).unwrap();

        let doc = sample().stamped(first);
        assert_eq!(doc.created_at, first.timestamp_millis());

        let restamped = doc.stamped(later);
        assert_eq!(restamped.created_at, first.timestamp_millis());
    }

    #[test]
    fn test_serialization_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["published_at"], "2021-06-01T10:00:00Z");
        assert_eq!(json["thumbnail_url"], "https://example.com/t.jpg");
        assert_eq!(json["channel_title"], "Channel");
        assert_eq!(json["created_at"], 0);
    }
}
