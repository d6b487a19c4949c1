//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `VideoStoreProvider`
//! and `PartitionAdmin` using the OpenSearch Rust crate.

use async_trait::async_trait;
use chrono::Utc;
use opensearch::{
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    IndexParts, OpenSearch, SearchParts,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};
use url::Url;
use video_registry_shared::{PageRequest, SearchText, StoredVideo, VideoDocument};

use crate::errors::VideoStoreError;
use crate::interfaces::{PartitionAdmin, VideoStoreProvider};
use crate::opensearch::index_config::get_index_settings;
use crate::partition::{PartitionManager, PartitionScheme};
use crate::query;
use crate::types::{StoreHits, WriteOutcome, WriteResult};

/// Error type OpenSearch reports when a partition is created concurrently.
const ALREADY_EXISTS_ERROR: &str = "resource_already_exists_exception";

/// OpenSearch provider implementation.
///
/// Writes go to the monthly partition resolved by a `PartitionManager`;
/// reads go through the scheme's alias.
///
/// # Example
///
/// ```ignore
/// use video_registry_repository::{OpenSearchProvider, PartitionScheme};
///
/// let provider = OpenSearchProvider::new("http://localhost:9200", PartitionScheme::default()).await?;
/// provider.add_document(&document).await?;
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
    partitions: PartitionManager,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `scheme` - Partition prefix and read alias
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(VideoStoreError)` - If connection setup fails
    pub async fn new(url: &str, scheme: PartitionScheme) -> Result<Self, VideoStoreError> {
        let parsed_url = Url::parse(url).map_err(|e| VideoStoreError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| VideoStoreError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            prefix = %scheme.prefix,
            alias = %scheme.alias,
            "Created OpenSearch provider"
        );

        Ok(Self {
            client,
            partitions: PartitionManager::new(scheme),
        })
    }

    /// Check that the cluster answers at all.
    pub async fn ping(&self) -> Result<(), VideoStoreError> {
        let response = self
            .client
            .ping()
            .send()
            .await
            .map_err(|e| VideoStoreError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            return Err(VideoStoreError::connection(format!(
                "Ping failed with status {}",
                response.status_code()
            )));
        }
        Ok(())
    }

    fn alias(&self) -> &str {
        &self.partitions.scheme().alias
    }

    /// Run one query against the alias. A 404 means no partition exists yet.
    async fn run_query(
        &self,
        query: Value,
        page: &PageRequest,
    ) -> Result<Option<StoreHits>, VideoStoreError> {
        let body = query::request_body(query, page.sort_or_default(), page.offset, page.limit);
        let alias = self.alias();

        let response = self
            .client
            .search(SearchParts::Index(&[alias]))
            .body(body)
            .send()
            .await
            .map_err(|e| VideoStoreError::query(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            debug!(alias = %alias, "Alias does not resolve to any partition yet");
            return Ok(None);
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Search request failed");
            return Err(VideoStoreError::query(format!(
                "Search failed with status {}: {}",
                status, error_body
            )));
        }

        let body = read_json(response).await?;
        parse_search_response(&body).map(Some)
    }
}

async fn read_json(response: Response) -> Result<Value, VideoStoreError> {
    response
        .json::<Value>()
        .await
        .map_err(|e| VideoStoreError::parse(e.to_string()))
}

/// Turn a search response body into rows and the total hit count.
///
/// Each row carries the partition it came from and its document id next to
/// the stored fields. The total may be reported either as a plain number or
/// as `{"value": n, ...}` depending on the server version.
pub fn parse_search_response(body: &Value) -> Result<StoreHits, VideoStoreError> {
    let hits = body
        .get("hits")
        .ok_or_else(|| VideoStoreError::parse("Search response has no hits"))?;

    let total = match hits.get("total") {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::Object(total)) => total.get("value").and_then(Value::as_u64),
        _ => None,
    }
    .ok_or_else(|| VideoStoreError::parse("Search response has no total hit count"))?;

    let rows = hits
        .get("hits")
        .and_then(Value::as_array)
        .map(|hits| hits.iter().map(parse_hit).collect::<Result<Vec<_>, _>>())
        .transpose()?
        .unwrap_or_default();

    Ok(StoreHits { rows, total })
}

fn parse_hit(hit: &Value) -> Result<StoredVideo, VideoStoreError> {
    let video_index = hit
        .get("_index")
        .and_then(Value::as_str)
        .ok_or_else(|| VideoStoreError::parse("Hit has no _index"))?;
    let video_id = hit
        .get("_id")
        .and_then(Value::as_str)
        .ok_or_else(|| VideoStoreError::parse("Hit has no _id"))?;
    let source = hit
        .get("_source")
        .cloned()
        .ok_or_else(|| VideoStoreError::parse(format!("Hit {} has no _source", video_id)))?;

    let document: VideoDocument = serde_json::from_value(source)
        .map_err(|e| VideoStoreError::parse(format!("Hit {}: {}", video_id, e)))?;

    Ok(StoredVideo {
        video_index: video_index.to_string(),
        video_id: video_id.to_string(),
        document,
    })
}

fn is_already_exists(body: &Value) -> bool {
    body["error"]["type"].as_str() == Some(ALREADY_EXISTS_ERROR)
}

#[async_trait]
impl PartitionAdmin for OpenSearchProvider {
    async fn partition_exists(&self, name: &str) -> Result<bool, VideoStoreError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[name]))
            .send()
            .await
            .map_err(|e| VideoStoreError::index_creation(e.to_string()))?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(VideoStoreError::index_creation(format!(
                "Existence check for {} failed with status {}",
                name, status
            ))),
        }
    }

    /// Create a partition attached to the alias.
    ///
    /// Another writer may create the same partition first; that is treated
    /// as success.
    async fn create_partition(&self, name: &str) -> Result<(), VideoStoreError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(name))
            .body(get_index_settings(self.alias()))
            .send()
            .await
            .map_err(|e| VideoStoreError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if status.is_success() {
            return Ok(());
        }

        let error_body = response.json::<Value>().await.unwrap_or_default();
        if status.as_u16() == 400 && is_already_exists(&error_body) {
            warn!(partition = %name, "Partition was created concurrently");
            return Ok(());
        }

        error!(status = %status, body = %error_body, "Partition creation failed");
        Err(VideoStoreError::index_creation(format!(
            "Creating {} failed with status {}: {}",
            name, status, error_body
        )))
    }
}

#[async_trait]
impl VideoStoreProvider for OpenSearchProvider {
    #[instrument(skip(self, document), fields(video_id = %document.id))]
    async fn add_document(&self, document: &VideoDocument) -> Result<WriteOutcome, VideoStoreError> {
        let partition = self.partitions.resolve_write_partition(self).await?;
        let stamped = document.stamped(Utc::now());
        let body = serde_json::to_value(&stamped)
            .map_err(|e| VideoStoreError::serialization(e.to_string()))?;
        let doc_id = stamped.document_id();

        let response = self
            .client
            .index(IndexParts::IndexId(&partition, doc_id))
            .body(body)
            .send()
            .await
            .map_err(|e| VideoStoreError::index(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Err(VideoStoreError::index_not_found(partition));
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index request failed");
            return Err(VideoStoreError::index(format!(
                "Index failed with status {}: {}",
                status, error_body
            )));
        }

        let body = read_json(response).await?;
        let result = match body["result"].as_str() {
            Some("updated") => WriteResult::Updated,
            _ => WriteResult::Created,
        };

        debug!(partition = %partition, doc_id = %doc_id, result = ?result, "Document written");
        Ok(WriteOutcome {
            partition,
            document_id: doc_id.to_string(),
            result,
        })
    }

    async fn list_all(&self, page: &PageRequest) -> Result<Option<StoreHits>, VideoStoreError> {
        self.run_query(query::all_documents(), page).await
    }

    async fn search(
        &self,
        page: &PageRequest,
        text: &SearchText,
    ) -> Result<Option<StoreHits>, VideoStoreError> {
        self.run_query(query::search_query(text), page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source(id: &str) -> Value {
        json!({
            "id": id,
            "kind": "youtube#video",
            "published_at": "2021-06-15T10:00:00Z",
            "title": "Derby highlights",
            "description": "All the goals",
            "thumbnail_url": "https://i.ytimg.com/vi/x/default.jpg",
            "channel_title": "Sports",
            "created_at": 1623751200000_i64
        })
    }

    #[test]
    fn test_parse_search_response_with_object_total() {
        let body = json!({
            "hits": {
                "total": { "value": 42, "relation": "eq" },
                "hits": [
                    { "_index": "videos_2021_6", "_id": "abc", "_source": source("abc") },
                    { "_index": "videos_2021_5", "_id": "def", "_source": source("def") }
                ]
            }
        });

        let hits = parse_search_response(&body).unwrap();

        assert_eq!(hits.total, 42);
        assert_eq!(hits.rows.len(), 2);
        assert_eq!(hits.rows[0].video_index, "videos_2021_6");
        assert_eq!(hits.rows[0].video_id, "abc");
        assert_eq!(hits.rows[1].document.id, "def");
        assert_eq!(hits.rows[0].document.created_at, 1623751200000);
    }

    #[test]
    fn test_parse_search_response_with_numeric_total() {
        let body = json!({ "hits": { "total": 0, "hits": [] } });

        let hits = parse_search_response(&body).unwrap();

        assert_eq!(hits, StoreHits::empty());
    }

    #[test]
    fn test_parse_search_response_missing_hits() {
        let result = parse_search_response(&json!({ "took": 3 }));
        assert!(matches!(result.unwrap_err(), VideoStoreError::ParseError(_)));
    }

    #[test]
    fn test_parse_search_response_bad_source() {
        let body = json!({
            "hits": {
                "total": { "value": 1 },
                "hits": [{ "_index": "videos_2021_6", "_id": "abc", "_source": { "id": 7 } }]
            }
        });

        assert!(matches!(
            parse_search_response(&body).unwrap_err(),
            VideoStoreError::ParseError(_)
        ));
    }

    #[test]
    fn test_already_exists_detection() {
        let body = json!({
            "error": { "type": "resource_already_exists_exception", "index": "videos_2021_6" },
            "status": 400
        });
        assert!(is_already_exists(&body));
        assert!(!is_already_exists(&json!({ "error": { "type": "mapper_parsing_exception" } })));
        assert!(!is_already_exists(&Value::Null));
    }
}
