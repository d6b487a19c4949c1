//! Result types returned by the read API.

use serde::{Deserialize, Serialize};

use super::video_document::VideoDocument;

/// A single stored video as returned by list and search.
///
/// Carries the store-assigned partition name and document id next to the
/// stored fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredVideo {
    /// Name of the partition the document was read from.
    pub video_index: String,

    /// The store's document id.
    pub video_id: String,

    #[serde(flatten)]
    pub document: VideoDocument,
}

/// Pagination block of a [`VideosPage`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub offset: usize,
    /// Number of rows in this page.
    pub count_per_page: usize,
    /// Total hits reported by the store. May exceed `count_per_page`.
    pub total_count: u64,
}

/// A page of stored videos with its pagination block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideosPage {
    pub details: Vec<StoredVideo>,
    pub pagination: Pagination,
}

impl VideosPage {
    /// Build a page from the rows returned by the store and its hit count.
    pub fn new(details: Vec<StoredVideo>, offset: usize, total_count: u64) -> Self {
        let count_per_page = details.len();
        Self {
            details,
            pagination: Pagination {
                offset,
                count_per_page,
                total_count,
            },
        }
    }

    /// Returns true if the page holds no rows.
    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    /// Returns the number of rows in this page.
    pub fn len(&self) -> usize {
        self.details.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str) -> StoredVideo {
        StoredVideo {
            video_index: "videos_2021_6".to_string(),
            video_id: id.to_string(),
            document: VideoDocument::new(id, "youtube#video", "2021-06-01T10:00:00Z", "t", "d", "u", "c"),
        }
    }

    #[test]
    fn test_page_counts_rows() {
        let page = VideosPage::new(vec![row("a"), row("b")], 10, 57);
        assert_eq!(page.len(), 2);
        assert_eq!(page.pagination.count_per_page, 2);
        assert_eq!(page.pagination.offset, 10);
        assert_eq!(page.pagination.total_count, 57);
    }

    #[test]
    fn test_row_serializes_flat() {
        let json = serde_json::to_value(row("a")).unwrap();
        assert_eq!(json["video_index"], "videos_2021_6");
        assert_eq!(json["video_id"], "a");
        assert_eq!(json["id"], "a");
        assert_eq!(json["title"], "t");
        assert!(json.get("document").is_none());
    }
}
