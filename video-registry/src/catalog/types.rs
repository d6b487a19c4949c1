//! Wire types for the catalog's search and details endpoints.
//!
//! Only the fields the registry reads are modelled; everything else in the
//! upstream payload is ignored on deserialization.

use serde::Deserialize;
use serde_json::Value;
use video_registry_shared::VideoDocument;

/// Largest number of results or ids the catalog accepts per call.
pub const MAX_RESULTS_PER_CALL: usize = 50;

/// Parameters of one discovery call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryQuery {
    /// Free-text query sent as `q`.
    pub query: String,
    /// Lower bound on publication time, `%Y-%m-%dT%H:%M:%SZ`.
    pub published_after: String,
    /// Continuation token from the previous page.
    pub page_token: Option<String>,
}

impl DiscoveryQuery {
    pub fn new(query: impl Into<String>, published_after: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            published_after: published_after.into(),
            page_token: None,
        }
    }

    /// The same query positioned at the given page.
    pub fn with_page_token(&self, page_token: Option<String>) -> Self {
        Self {
            page_token,
            ..self.clone()
        }
    }
}

/// One page of the search endpoint's answer.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryPage {
    #[serde(default)]
    pub items: Vec<ItemRef>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub page_info: Option<PageInfo>,
}

impl DiscoveryPage {
    /// Ids of the entries that carry one, in page order.
    ///
    /// Channels and playlists come back without a video id and are dropped.
    pub fn video_ids(&self) -> Vec<String> {
        self.items
            .iter()
            .filter_map(|item| item.id.video_id.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ItemRef {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub id: ItemId,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemId {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub results_per_page: u64,
}

/// The details endpoint's answer.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct DetailsPage {
    #[serde(default)]
    pub items: Vec<DetailEntry>,
}

/// One entry of a details page.
///
/// Entries are decoded one by one, so a single item missing required fields
/// does not fail the whole page.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DetailEntry {
    Video(ItemDetail),
    Malformed(Value),
}

impl DetailEntry {
    /// The item id, when the entry carries one.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Video(detail) => Some(&detail.id),
            Self::Malformed(raw) => raw.get("id").and_then(Value::as_str),
        }
    }
}

impl From<ItemDetail> for DetailEntry {
    fn from(detail: ItemDetail) -> Self {
        Self::Video(detail)
    }
}

/// A single video resource with its snippet.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ItemDetail {
    pub kind: String,
    pub id: String,
    pub snippet: Snippet,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub published_at: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
    #[serde(default)]
    pub channel_title: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Thumbnails {
    #[serde(default)]
    pub default: Option<Thumbnail>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Thumbnail {
    pub url: String,
}

/// Projection of a catalog video onto the stored document.
///
/// A missing default thumbnail becomes an empty URL.
impl From<ItemDetail> for VideoDocument {
    fn from(detail: ItemDetail) -> Self {
        let thumbnail_url = detail
            .snippet
            .thumbnails
            .default
            .map(|thumbnail| thumbnail.url)
            .unwrap_or_default();

        VideoDocument::new(
            detail.id,
            detail.kind,
            detail.snippet.published_at,
            detail.snippet.title,
            detail.snippet.description,
            thumbnail_url,
            detail.snippet.channel_title,
        )
    }
}
