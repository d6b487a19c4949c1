//! Request and response types for store operations.

use video_registry_shared::StoredVideo;

/// Rows returned by a list or search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreHits {
    /// The rows of the requested window.
    pub rows: Vec<StoredVideo>,
    /// Total number of matching documents reported by the store.
    /// May be greater than the number of returned rows due to pagination.
    pub total: u64,
}

impl StoreHits {
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            total: 0,
        }
    }
}

/// What a single document write did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    Created,
    Updated,
}

/// Result of writing one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// The partition the document was written to.
    pub partition: String,
    /// The store's document id.
    pub document_id: String,
    pub result: WriteResult,
}
