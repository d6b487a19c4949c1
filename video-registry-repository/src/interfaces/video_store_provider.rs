//! Video store provider trait definition.
//!
//! This module defines the abstract interface for the video store, allowing
//! for different backend implementations (OpenSearch, in-memory, etc.).

use async_trait::async_trait;
use video_registry_shared::{PageRequest, SearchText, VideoDocument};

use crate::errors::VideoStoreError;
use crate::types::{StoreHits, WriteOutcome};

/// Abstracts the underlying document store.
///
/// This is the only way the rest of the system reads or writes videos.
/// Implementations are injected into the discovery loop and into
/// `VideoRegistryService`, which makes testing with mock implementations easy.
///
/// # Partitioning
///
/// Writes go to the partition of the current calendar month, created lazily
/// on first use. Reads always go through the alias that spans every
/// partition.
///
/// # Missing index on read
///
/// `list_all` and `search` return `Ok(None)` when the alias does not resolve
/// to any index yet. Transport, parse and serialization failures are errors.
#[async_trait]
pub trait VideoStoreProvider: Send + Sync {
    /// Write a document into the current month's partition, keyed by its id.
    ///
    /// The document's `created_at` is stamped with the current time. Writing
    /// the same id twice in one partition overwrites the first write.
    ///
    /// # Arguments
    ///
    /// * `document` - The projected video document
    ///
    /// # Returns
    ///
    /// * `Ok(WriteOutcome)` - Partition, document id and whether it was created or updated
    /// * `Err(VideoStoreError)` - If the partition could not be resolved or the write failed
    async fn add_document(&self, document: &VideoDocument)
        -> Result<WriteOutcome, VideoStoreError>;

    /// List every stored document through the alias.
    ///
    /// # Arguments
    ///
    /// * `page` - Offset/limit window and optional sort field
    ///
    /// # Returns
    ///
    /// * `Ok(Some(StoreHits))` - At most `page.limit` rows and the total hit count
    /// * `Ok(None)` - If no partition exists yet
    /// * `Err(VideoStoreError)` - If the query fails
    async fn list_all(&self, page: &PageRequest) -> Result<Option<StoreHits>, VideoStoreError>;

    /// Search titles and descriptions through the alias.
    ///
    /// # Arguments
    ///
    /// * `page` - Offset/limit window and optional sort field
    /// * `text` - Free text or a list of terms, matched with OR semantics
    ///
    /// # Returns
    ///
    /// * `Ok(Some(StoreHits))` - At most `page.limit` rows and the total hit count
    /// * `Ok(None)` - If no partition exists yet
    /// * `Err(VideoStoreError)` - If the query fails
    async fn search(
        &self,
        page: &PageRequest,
        text: &SearchText,
    ) -> Result<Option<StoreHits>, VideoStoreError>;
}
