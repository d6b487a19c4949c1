//! Video registry read service.
//!
//! This module provides the service the read API uses to list and search
//! stored videos. It validates the request window, delegates to a
//! `VideoStoreProvider` and wraps the rows into a `VideosPage`.

use std::sync::Arc;

use tracing::{debug, instrument};
use video_registry_shared::{PageRequest, SearchText, VideosPage};

use crate::errors::VideoStoreError;
use crate::interfaces::VideoStoreProvider;
use crate::types::StoreHits;

/// The main service for reading the video registry.
///
/// All operations return `VideoStoreError` for consistent error handling.
/// An absent alias and an empty result both come back as `Ok(None)`, so
/// callers only need to tell "nothing to show" apart from a failure.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use video_registry_repository::{InMemoryVideoStore, VideoRegistryService};
/// use video_registry_shared::PageRequest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = VideoRegistryService::new(Arc::new(InMemoryVideoStore::default()));
///
/// if let Some(page) = service.list_videos(PageRequest::default()).await? {
///     println!("{} of {}", page.pagination.count_per_page, page.pagination.total_count);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct VideoRegistryService {
    provider: Arc<dyn VideoStoreProvider>,
}

impl VideoRegistryService {
    /// Create a new service over the given provider.
    pub fn new(provider: Arc<dyn VideoStoreProvider>) -> Self {
        Self { provider }
    }

    /// List stored videos, newest publication first unless `page.sort` says otherwise.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(VideosPage))` - At least one row
    /// * `Ok(None)` - No partition yet, or the window holds no rows
    /// * `Err(VideoStoreError::ValidationError)` - If the window is out of range
    /// * `Err(VideoStoreError)` - If the query fails
    #[instrument(skip(self))]
    pub async fn list_videos(&self, page: PageRequest) -> Result<Option<VideosPage>, VideoStoreError> {
        page.validate().map_err(VideoStoreError::validation)?;

        let hits = self.provider.list_all(&page).await?;
        Ok(Self::into_page(hits, &page))
    }

    /// Search titles and descriptions for any of the given terms.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(VideosPage))` - At least one row
    /// * `Ok(None)` - No partition yet, or nothing matched in the window
    /// * `Err(VideoStoreError::ValidationError)` - If the window is out of range or the text is blank
    /// * `Err(VideoStoreError)` - If the query fails
    #[instrument(skip(self))]
    pub async fn search_videos(
        &self,
        page: PageRequest,
        text: SearchText,
    ) -> Result<Option<VideosPage>, VideoStoreError> {
        page.validate().map_err(VideoStoreError::validation)?;
        if text.is_blank() {
            return Err(VideoStoreError::validation("query is required"));
        }

        let hits = self.provider.search(&page, &text).await?;
        Ok(Self::into_page(hits, &page))
    }

    fn into_page(hits: Option<StoreHits>, page: &PageRequest) -> Option<VideosPage> {
        match hits {
            Some(hits) if !hits.rows.is_empty() => {
                Some(VideosPage::new(hits.rows, page.offset, hits.total))
            }
            Some(hits) => {
                debug!(total = hits.total, offset = page.offset, "Empty window");
                None
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryVideoStore;
    use crate::types::WriteOutcome;
    use async_trait::async_trait;
    use tokio::sync::Mutex;
    use video_registry_shared::{StoredVideo, VideoDocument};

    /// Mock provider for testing
    struct MockProvider {
        hits: Option<StoreHits>,
        searches: Mutex<Vec<(PageRequest, SearchText)>>,
        should_fail: bool,
    }

    impl MockProvider {
        fn new(hits: Option<StoreHits>) -> Self {
            Self {
                hits,
                searches: Mutex::new(Vec::new()),
                should_fail: false,
            }
        }
    }

    #[async_trait]
    impl VideoStoreProvider for MockProvider {
        async fn add_document(
            &self,
            _document: &VideoDocument,
        ) -> Result<WriteOutcome, VideoStoreError> {
            Err(VideoStoreError::index("read-only mock"))
        }

        async fn list_all(&self, _page: &PageRequest) -> Result<Option<StoreHits>, VideoStoreError> {
            if self.should_fail {
                return Err(VideoStoreError::query("Mock failure"));
            }
            Ok(self.hits.clone())
        }

        async fn search(
            &self,
            page: &PageRequest,
            text: &SearchText,
        ) -> Result<Option<StoreHits>, VideoStoreError> {
            self.searches.lock().await.push((page.clone(), text.clone()));
            Ok(self.hits.clone())
        }
    }

    fn stored(id: &str) -> StoredVideo {
        StoredVideo {
            video_index: "videos_2021_6".to_string(),
            video_id: id.to_string(),
            document: VideoDocument::new(id, "youtube#video", "2021-06-01T00:00:00Z", "t", "d", "u", "c"),
        }
    }

    #[tokio::test]
    async fn test_list_wraps_rows_with_pagination() {
        let provider = MockProvider::new(Some(StoreHits {
            rows: vec![stored("a"), stored("b")],
            total: 40,
        }));
        let service = VideoRegistryService::new(Arc::new(provider));

        let page = service
            .list_videos(PageRequest::new(2, 10))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(page.pagination.offset, 10);
        assert_eq!(page.pagination.count_per_page, 2);
        assert_eq!(page.pagination.total_count, 40);
    }

    #[tokio::test]
    async fn test_missing_alias_is_none() {
        let service = VideoRegistryService::new(Arc::new(MockProvider::new(None)));

        assert!(service.list_videos(PageRequest::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_window_is_none() {
        let provider = MockProvider::new(Some(StoreHits {
            rows: vec![],
            total: 3,
        }));
        let service = VideoRegistryService::new(Arc::new(provider));

        assert!(service
            .list_videos(PageRequest::new(10, 100))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_out_of_range_window_is_rejected() {
        let service = VideoRegistryService::new(Arc::new(MockProvider::new(None)));

        let too_big = service.list_videos(PageRequest::new(2001, 0)).await;
        let zero = service.list_videos(PageRequest::new(0, 0)).await;
        let far = service.list_videos(PageRequest::new(10, 10_001)).await;

        assert!(too_big.unwrap_err().is_validation());
        assert!(zero.unwrap_err().is_validation());
        assert!(far.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_blank_search_is_rejected_before_provider() {
        let provider = Arc::new(MockProvider::new(None));
        let service = VideoRegistryService::new(provider.clone());

        let result = service
            .search_videos(PageRequest::default(), SearchText::from("   "))
            .await;

        assert!(result.unwrap_err().is_validation());
        assert!(provider.searches.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_search_forwards_text() {
        let provider = Arc::new(MockProvider::new(Some(StoreHits {
            rows: vec![stored("a")],
            total: 1,
        })));
        let service = VideoRegistryService::new(provider.clone());

        service
            .search_videos(PageRequest::default(), SearchText::from("derby"))
            .await
            .unwrap();

        let searches = provider.searches.lock().await;
        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].1, SearchText::from("derby"));
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let mut provider = MockProvider::new(None);
        provider.should_fail = true;
        let service = VideoRegistryService::new(Arc::new(provider));

        let result = service.list_videos(PageRequest::default()).await;

        assert!(matches!(result.unwrap_err(), VideoStoreError::QueryError(_)));
    }

    #[tokio::test]
    async fn test_page_never_exceeds_limit_over_memory_store() {
        let store = Arc::new(InMemoryVideoStore::default());
        for i in 0..7 {
            let video = VideoDocument::new(
                format!("v{}", i),
                "youtube#video",
                format!("2021-06-0{}T00:00:00Z", i + 1),
                "Derby",
                "",
                "",
                "",
            );
            store.add_document(&video).await.unwrap();
        }
        let service = VideoRegistryService::new(store);

        let page = service
            .search_videos(PageRequest::new(3, 0), SearchText::from("derby"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(page.len(), 3);
        assert_eq!(page.pagination.total_count, 7);
        assert_eq!(page.details[0].video_id, "v6");
    }
}
