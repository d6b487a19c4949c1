//! HTTP client for the YouTube Data API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, ClientBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::catalog::types::{DetailsPage, DiscoveryPage, DiscoveryQuery, MAX_RESULTS_PER_CALL};
use crate::catalog::VideoCatalog;
use crate::errors::CatalogError;

/// Default catalog base URL.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

/// Path of the search endpoint.
pub const SEARCH_PATH: &str = "/youtube/v3/search";

/// Path of the video details endpoint.
pub const VIDEOS_PATH: &str = "/youtube/v3/videos";

/// How a catalog response status is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 2xx: decode the body.
    Success,
    /// 4xx: no result for this key, try another one.
    Rejected,
    /// Anything else: the catalog is unavailable.
    Unavailable,
}

impl StatusClass {
    pub fn of(status: u16) -> Self {
        match status {
            200..=299 => Self::Success,
            400..=499 => Self::Rejected,
            _ => Self::Unavailable,
        }
    }
}

/// Production catalog client.
///
/// No retries happen here; a key that is rejected is reported as `Ok(None)`
/// and the caller decides what to try next.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use video_registry::catalog::{YoutubeCatalogClient, DEFAULT_BASE_URL};
///
/// let client = YoutubeCatalogClient::new(DEFAULT_BASE_URL, Duration::from_secs(20))?;
/// let page = client.search_videos(&query, "my-key").await?;
/// ```
pub struct YoutubeCatalogClient {
    base_url: String,
    client: ReqwestClient,
}

impl YoutubeCatalogClient {
    /// Create a client whose requests time out after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CatalogError> {
        Self::from_builder(base_url, ReqwestClient::builder(), timeout)
    }

    fn from_builder(
        base_url: &str,
        builder: ClientBuilder,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let client = builder
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::client(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Option<T>, CatalogError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                // The request URL carries the key, so only the kind of failure is kept
                let kind = if e.is_timeout() {
                    "timed out"
                } else if e.is_connect() {
                    "connection failed"
                } else {
                    "request failed"
                };
                error!(path = %path, kind = kind, "Catalog request did not complete");
                CatalogError::timeout(format!("{} {}", path, kind))
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            CatalogError::timeout(format!("{} body could not be read: {}", path, e.without_url()))
        })?;

        match StatusClass::of(status) {
            StatusClass::Success => {
                debug!(path = %path, status = status, bytes = body.len(), "Catalog request succeeded");
                serde_json::from_str(&body)
                    .map(Some)
                    .map_err(|e| CatalogError::decode(format!("{}: {}", path, e)))
            }
            StatusClass::Rejected => {
                warn!(path = %path, status = status, body = %body, "Catalog rejected the request");
                Ok(None)
            }
            StatusClass::Unavailable => {
                error!(path = %path, status = status, body = %body, "Catalog unavailable");
                Err(CatalogError::unavailable(status, body))
            }
        }
    }
}

/// Query parameters of a discovery call.
pub fn search_params(query: &DiscoveryQuery, api_key: &str) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("type", "video".to_string()),
        ("order", "date".to_string()),
        ("publishedAfter", query.published_after.clone()),
        ("maxResults", MAX_RESULTS_PER_CALL.to_string()),
        ("key", api_key.to_string()),
        ("q", query.query.clone()),
    ];
    if let Some(token) = &query.page_token {
        params.push(("pageToken", token.clone()));
    }
    params
}

/// Query parameters of a details call.
pub fn details_params(ids: &[String], api_key: &str) -> Vec<(&'static str, String)> {
    vec![
        ("key", api_key.to_string()),
        ("id", ids.join(",")),
        ("part", "snippet".to_string()),
    ]
}

#[async_trait]
impl VideoCatalog for YoutubeCatalogClient {
    async fn search_videos(
        &self,
        query: &DiscoveryQuery,
        api_key: &str,
    ) -> Result<Option<DiscoveryPage>, CatalogError> {
        self.get(SEARCH_PATH, &search_params(query, api_key)).await
    }

    async fn video_details(
        &self,
        ids: &[String],
        api_key: &str,
    ) -> Result<Option<DetailsPage>, CatalogError> {
        self.get(VIDEOS_PATH, &details_params(ids, api_key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DetailEntry;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned HTTP answer; the handle yields the request head.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&head).into_owned()
        });

        (base_url, handle)
    }

    fn client(base_url: &str) -> YoutubeCatalogClient {
        let builder = ReqwestClient::builder().no_proxy();
        YoutubeCatalogClient::from_builder(base_url, builder, Duration::from_secs(5)).unwrap()
    }

    fn query() -> DiscoveryQuery {
        DiscoveryQuery::new("football", "2021-06-15T09:30:00Z")
    }

    fn value<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_status_classes() {
        assert_eq!(StatusClass::of(200), StatusClass::Success);
        assert_eq!(StatusClass::of(400), StatusClass::Rejected);
        assert_eq!(StatusClass::of(403), StatusClass::Rejected);
        assert_eq!(StatusClass::of(500), StatusClass::Unavailable);
        assert_eq!(StatusClass::of(503), StatusClass::Unavailable);
        assert_eq!(StatusClass::of(302), StatusClass::Unavailable);
    }

    #[test]
    fn test_search_params_first_page() {
        let query = DiscoveryQuery::new("football", "2021-06-15T09:30:00Z");
        let params = search_params(&query, "k1");

        assert_eq!(value(&params, "type"), Some("video"));
        assert_eq!(value(&params, "order"), Some("date"));
        assert_eq!(value(&params, "maxResults"), Some("50"));
        assert_eq!(value(&params, "publishedAfter"), Some("2021-06-15T09:30:00Z"));
        assert_eq!(value(&params, "q"), Some("football"));
        assert_eq!(value(&params, "key"), Some("k1"));
        assert_eq!(value(&params, "pageToken"), None);
    }

    #[test]
    fn test_search_params_next_page() {
        let query = DiscoveryQuery::new("football", "2021-06-15T09:30:00Z")
            .with_page_token(Some("CDIQAA".to_string()));

        assert_eq!(value(&search_params(&query, "k1"), "pageToken"), Some("CDIQAA"));
    }

    #[test]
    fn test_details_params_join_ids() {
        let ids = vec!["a".to_string(), "b".to_string()];
        let params = details_params(&ids, "k2");

        assert_eq!(value(&params, "id"), Some("a,b"));
        assert_eq!(value(&params, "part"), Some("snippet"));
        assert_eq!(value(&params, "key"), Some("k2"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client =
            YoutubeCatalogClient::new("http://localhost:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_success_decodes_discovery_page() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"nextPageToken":"CDIQAA","items":[{"kind":"youtube#searchResult","id":{"kind":"youtube#video","videoId":"abc"}}]}"#,
        )
        .await;

        let page = client(&base_url)
            .search_videos(&query(), "k1")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(page.video_ids(), vec!["abc".to_string()]);
        assert_eq!(page.next_page_token.as_deref(), Some("CDIQAA"));

        let head = server.await.unwrap();
        assert!(head.starts_with("GET /youtube/v3/search?"));
        assert!(head.contains("key=k1"));
    }

    #[tokio::test]
    async fn test_rejected_key_yields_no_result() {
        let (base_url, _server) =
            serve_once("403 Forbidden", r#"{"error":{"code":403,"message":"quotaExceeded"}}"#).await;

        let result = client(&base_url).search_videos(&query(), "k1").await;

        assert_eq!(result, Ok(None));
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let (base_url, _server) = serve_once("503 Service Unavailable", "backendError").await;

        let result = client(&base_url)
            .video_details(&["abc".to_string()], "k1")
            .await;

        assert_eq!(result, Err(CatalogError::unavailable(503, "backendError")));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_decode_error() {
        let (base_url, _server) = serve_once("200 OK", "not json").await;

        let result = client(&base_url).search_videos(&query(), "k1").await;

        assert!(matches!(result, Err(CatalogError::DecodeError(_))));
    }

    #[tokio::test]
    async fn test_details_keep_valid_items_next_to_malformed_ones() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"items":[{"kind":"youtube#video","id":"a","snippet":{"publishedAt":"2021-06-15T10:00:00Z","title":"t"}},{"kind":"youtube#video","id":"b","snippet":{"title":"t"}}]}"#,
        )
        .await;

        let details = client(&base_url)
            .video_details(&["a".to_string(), "b".to_string()], "k1")
            .await
            .unwrap()
            .unwrap();

        assert!(matches!(&details.items[0], DetailEntry::Video(d) if d.id == "a"));
        assert!(matches!(details.items[1], DetailEntry::Malformed(_)));

        let head = server.await.unwrap();
        assert!(head.starts_with("GET /youtube/v3/videos?"));
        assert!(head.contains("id=a%2Cb"));
    }

    #[tokio::test]
    async fn test_unreachable_catalog_is_unavailable_with_timeout_status() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let result = client(&base_url).search_videos(&query(), "k1").await;

        assert!(matches!(
            result,
            Err(CatalogError::Unavailable { status: 408, .. })
        ));
    }
}
