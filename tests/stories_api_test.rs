use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

use hn_aggregator::client::ItemStore;
use hn_aggregator::config::CacheConfig;
use hn_aggregator::errors::{AppResult, SourceError};
use hn_aggregator::models::Story;
use hn_aggregator::service::StoryService;
use hn_aggregator::web::{AppState, WebServer};

/// Canned item store backing the router under test
struct FixtureStore {
    index: Vec<u64>,
    stories: HashMap<u64, Story>,
    fail_index: bool,
}

impl FixtureStore {
    fn new(index: Vec<u64>) -> Self {
        Self {
            index,
            stories: HashMap::new(),
            fail_index: false,
        }
    }

    fn failing_index() -> Self {
        let mut store = Self::new(Vec::new());
        store.fail_index = true;
        store
    }

    fn with_story(mut self, id: u64, title: &str, author: &str) -> Self {
        self.stories.insert(
            id,
            Story {
                id,
                title: title.to_string(),
                url: Some(format!("https://example.com/{id}")),
                author: author.to_string(),
                published_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
                score: 42,
                comments_count: 7,
            },
        );
        self
    }
}

#[async_trait]
impl ItemStore for FixtureStore {
    async fn fetch_item(&self, id: u64) -> Option<Story> {
        self.stories.get(&id).cloned()
    }

    async fn fetch_index(&self) -> AppResult<Vec<u64>> {
        if self.fail_index {
            return Err(SourceError::fetch_failed("fixture://index", "unreachable").into());
        }
        Ok(self.index.clone())
    }
}

fn app(store: FixtureStore) -> Router {
    let config = CacheConfig {
        item_ttl_seconds: 300,
        index_ttl_seconds: 300,
        search_ttl_seconds: 600,
        search_prefix_len: 200,
        overfetch_factor: 2,
    };
    let service = StoryService::new(Arc::new(store), &config);
    WebServer::router(AppState {
        service: Arc::new(service),
    })
}

// Helper function to send requests to the app
async fn send_request(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json: Value = if body_bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(json!({}))
    };

    (status, json)
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = app(FixtureStore::new(Vec::new()));

    let (status, response) = send_request(&app, Method::GET, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "healthy");
    assert!(response.get("timestamp").is_some());
}

#[tokio::test]
async fn test_newest_stories_page_shape() {
    let app = app(
        FixtureStore::new(vec![1, 2, 3])
            .with_story(1, "First", "alice")
            .with_story(2, "Second", "bob")
            .with_story(3, "Third", "carol"),
    );

    let (status, body) =
        send_request(&app, Method::GET, "/api/v1/stories/newest?page=1&size=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["total_count"], 3);
    assert_eq!(body["page_number"], 1);
    assert_eq!(body["page_size"], 2);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["items"][0]["id"], 1);
    assert_eq!(body["items"][0]["title"], "First");
    assert_eq!(body["items"][0]["author"], "alice");
}

#[tokio::test]
async fn test_defaults_applied_when_params_missing() {
    let app = app(FixtureStore::new(vec![1]).with_story(1, "Only", "alice"));

    let (status, body) = send_request(&app, Method::GET, "/api/v1/stories/newest").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page_number"], 1);
    assert_eq!(body["page_size"], 20);
}

#[tokio::test]
async fn test_page_and_size_are_clamped() {
    let app = app(FixtureStore::new(vec![1]).with_story(1, "Only", "alice"));

    let (status, body) =
        send_request(&app, Method::GET, "/api/v1/stories/newest?page=0&size=5000").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page_number"], 1);
    assert_eq!(body["page_size"], 100);
}

#[tokio::test]
async fn test_search_filters_results() {
    let app = app(
        FixtureStore::new(vec![1, 2])
            .with_story(1, "Angular Framework", "dev1")
            .with_story(2, "Unrelated", "dev2"),
    );

    let (status, body) = send_request(
        &app,
        Method::GET,
        "/api/v1/stories/newest?page=1&size=20&search=angular",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["title"], "Angular Framework");
    assert_eq!(body["total_count"], 1);
}

#[tokio::test]
async fn test_index_failure_maps_to_service_unavailable() {
    let app = app(FixtureStore::failing_index());

    let (status, _) = send_request(&app, Method::GET, "/api/v1/stories/newest").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_get_story_by_id() {
    let app = app(FixtureStore::new(Vec::new()).with_story(7, "Lucky seven", "alice"));

    let (status, body) = send_request(&app, Method::GET, "/api/v1/stories/7").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 7);
    assert_eq!(body["title"], "Lucky seven");
    assert_eq!(body["comments_count"], 7);
}

#[tokio::test]
async fn test_get_story_by_id_not_found() {
    let app = app(FixtureStore::new(Vec::new()));

    let (status, _) = send_request(&app, Method::GET, "/api/v1/stories/999").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
