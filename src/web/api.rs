use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use super::AppState;
use crate::errors::AppError;
use crate::models::{PagedResult, Story};

/// Boundary limits for page requests; out-of-range values are clamped,
/// never rejected.
const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
pub struct StoriesQueryParams {
    pub page: Option<usize>,
    pub size: Option<usize>,
    pub search: Option<String>,
}

// Stories API
pub async fn get_newest_stories(
    State(state): State<AppState>,
    Query(params): Query<StoriesQueryParams>,
) -> Result<Json<PagedResult<Story>>, StatusCode> {
    let page = params.page.unwrap_or(1).max(1);
    let size = params.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    match state
        .service
        .newest_stories(page, size, params.search.as_deref())
        .await
    {
        Ok(stories) => Ok(Json(stories)),
        Err(e) => {
            error!("Failed to fetch stories: {}", e);
            Err(match e {
                AppError::Source(_) | AppError::Http(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            })
        }
    }
}

pub async fn get_story(
    Path(id): Path<u64>,
    State(state): State<AppState>,
) -> Result<Json<Story>, StatusCode> {
    match state.service.story_by_id(id).await {
        Some(story) => Ok(Json(story)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
