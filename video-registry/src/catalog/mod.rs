//! Catalog module for the video registry.
//!
//! Provides the video catalog interface and its YouTube implementation.

mod types;
mod youtube_client;

use async_trait::async_trait;

use crate::errors::CatalogError;

pub use types::{
    DetailEntry, DetailsPage, DiscoveryPage, DiscoveryQuery, ItemDetail, ItemId, ItemRef,
    PageInfo, Snippet, Thumbnail, Thumbnails, MAX_RESULTS_PER_CALL,
};
pub use youtube_client::{
    details_params, search_params, StatusClass, YoutubeCatalogClient, DEFAULT_BASE_URL,
    SEARCH_PATH, VIDEOS_PATH,
};

/// Read-only access to the video catalog.
///
/// Every call is made with one API key. `Ok(None)` means the catalog refused
/// the request for that key (a 4xx answer); key rotation then moves on to
/// the next key. `Err(CatalogError::Unavailable)` means the catalog itself is
/// failing and nothing else should be tried this cycle.
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    /// Fetch one page of recently published videos matching the query.
    async fn search_videos(
        &self,
        query: &DiscoveryQuery,
        api_key: &str,
    ) -> Result<Option<DiscoveryPage>, CatalogError>;

    /// Fetch the snippets of up to [`MAX_RESULTS_PER_CALL`] videos.
    async fn video_details(
        &self,
        ids: &[String],
        api_key: &str,
    ) -> Result<Option<DetailsPage>, CatalogError>;
}
