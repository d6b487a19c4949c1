//! HTTP read API for the video registry.
//!
//! Exposes listing and searching of stored videos. Handlers only read; the
//! discovery loop is the single writer.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use video_registry_repository::{VideoRegistryService, VideoStoreError};
use video_registry_shared::{PageRequest, SearchText, VideosPage};

/// Route listing stored videos.
pub const COLLECTIONS_PATH: &str = "/videos-registry/v1/collections";

/// Route searching stored videos.
pub const SEARCH_PATH: &str = "/videos-registry/v1/collections/search";

/// Route for liveness checks.
pub const HEALTH_PATH: &str = "/health";

const LIST_FAILURE: &str = "Error while fetching the video collection";
const SEARCH_FAILURE: &str = "Error while querying the video collection";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    service: VideoRegistryService,
}

/// Build the read API router.
pub fn router(service: VideoRegistryService) -> Router {
    Router::new()
        .route(COLLECTIONS_PATH, get(list_videos))
        .route(SEARCH_PATH, get(search_videos))
        .route(HEALTH_PATH, get(health_check))
        .layer(CorsLayer::permissive())
        .with_state(AppState { service })
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub query: Option<String>,
}

/// Errors returned to API callers. Store details never leave the process.
#[derive(Debug)]
pub enum ApiError {
    /// Out-of-range or missing parameters.
    Invalid(String),
    /// The store failed.
    Internal(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Invalid(detail) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "message": "Invalid request", "detail": detail })),
            )
                .into_response(),
            Self::Internal(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Internal server error", "detail": detail })),
            )
                .into_response(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Invalid(rejection.body_text())
    }
}

fn page_request(limit: Option<i64>, offset: Option<i64>) -> Result<PageRequest, ApiError> {
    let defaults = PageRequest::default();
    let limit = match limit {
        Some(limit) => usize::try_from(limit)
            .map_err(|_| ApiError::Invalid("limit must not be negative".to_string()))?,
        None => defaults.limit,
    };
    let offset = match offset {
        Some(offset) => usize::try_from(offset)
            .map_err(|_| ApiError::Invalid("offset must not be negative".to_string()))?,
        None => defaults.offset,
    };
    Ok(PageRequest::new(limit, offset))
}

fn respond(
    result: Result<Option<VideosPage>, VideoStoreError>,
    failure: &'static str,
) -> Result<Response, ApiError> {
    match result {
        Ok(Some(page)) => Ok(Json(page).into_response()),
        Ok(None) => Ok(Json(json!({})).into_response()),
        Err(e) if e.is_validation() => Err(ApiError::Invalid(e.to_string())),
        Err(e) => {
            error!(error = %e, "{}", failure);
            Err(ApiError::Internal(failure))
        }
    }
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

async fn list_videos(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let page = page_request(params.limit, params.offset)?;
    info!(limit = page.limit, offset = page.offset, "Getting the videos");

    respond(state.service.list_videos(page).await, LIST_FAILURE)
}

async fn search_videos(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let page = page_request(params.limit, params.offset)?;
    let text = SearchText::from(params.query.unwrap_or_default());
    info!(limit = page.limit, offset = page.offset, query = ?text, "Searching videos");

    respond(state.service.search_videos(page, text).await, SEARCH_FAILURE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;
    use video_registry_repository::{
        InMemoryVideoStore, StoreHits, VideoStoreProvider, WriteOutcome,
    };
    use video_registry_shared::VideoDocument;

    /// Provider whose reads always fail.
    struct FailingProvider;

    #[async_trait]
    impl VideoStoreProvider for FailingProvider {
        async fn add_document(
            &self,
            _document: &VideoDocument,
        ) -> Result<WriteOutcome, VideoStoreError> {
            Err(VideoStoreError::index("unreachable"))
        }

        async fn list_all(&self, _page: &PageRequest) -> Result<Option<StoreHits>, VideoStoreError> {
            Err(VideoStoreError::query("cluster red: shard failure on node-3"))
        }

        async fn search(
            &self,
            _page: &PageRequest,
            _text: &SearchText,
        ) -> Result<Option<StoreHits>, VideoStoreError> {
            Err(VideoStoreError::query("cluster red"))
        }
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn seeded_app() -> Router {
        let store = Arc::new(InMemoryVideoStore::default());
        let titles = [("a", "Derby highlights"), ("b", "Cup final"), ("c", "Cooking")];
        for (day, (id, title)) in titles.into_iter().enumerate() {
            let video = VideoDocument::new(
                id,
                "youtube#video",
                format!("2021-06-1{}T00:00:00Z", day),
                title,
                "",
                "",
                "Sports",
            );
            store.add_document(&video).await.unwrap();
        }
        router(VideoRegistryService::new(store))
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(VideoRegistryService::new(Arc::new(InMemoryVideoStore::default())));
        let (status, body) = get(app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_list_returns_envelope() {
        let (status, body) = get(seeded_app().await, "/videos-registry/v1/collections?limit=2").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["details"].as_array().unwrap().len(), 2);
        assert_eq!(body["pagination"]["offset"], 0);
        assert_eq!(body["pagination"]["count_per_page"], 2);
        assert_eq!(body["pagination"]["total_count"], 3);
        assert!(body["details"][0]["video_index"].as_str().unwrap().starts_with("videos_"));
        assert!(body["details"][0]["video_id"].is_string());
        assert!(body["details"][0]["created_at"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_empty_store_returns_empty_object() {
        let app = router(VideoRegistryService::new(Arc::new(InMemoryVideoStore::default())));
        let (status, body) = get(app, "/videos-registry/v1/collections").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));
    }

    #[tokio::test]
    async fn test_search_matches_any_word() {
        let (status, body) = get(
            seeded_app().await,
            "/videos-registry/v1/collections/search?query=derby%20final",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["total_count"], 2);
    }

    #[tokio::test]
    async fn test_search_without_query_is_rejected() {
        let (status, _) = get(seeded_app().await, "/videos-registry/v1/collections/search").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_out_of_range_parameters_are_rejected() {
        for uri in [
            "/videos-registry/v1/collections?limit=0",
            "/videos-registry/v1/collections?limit=2001",
            "/videos-registry/v1/collections?offset=10001",
            "/videos-registry/v1/collections?offset=-1",
        ] {
            let (status, _) = get(seeded_app().await, uri).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_non_numeric_parameters_are_rejected_as_json() {
        for uri in [
            "/videos-registry/v1/collections?limit=abc",
            "/videos-registry/v1/collections/search?query=derby&offset=1.5",
        ] {
            let (status, body) = get(seeded_app().await, uri).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", uri);
            assert_eq!(body["message"], "Invalid request", "{}", uri);
            assert!(body["detail"].is_string(), "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_generic() {
        let app = router(VideoRegistryService::new(Arc::new(FailingProvider)));
        let (status, body) = get(app, "/videos-registry/v1/collections").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
        assert_eq!(body["detail"], "Error while fetching the video collection");
        assert!(!body.to_string().contains("node-3"));
    }
}
