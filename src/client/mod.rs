//! Hacker News item store client
//!
//! This module provides the thin client over the Hacker News Firebase API.
//! The upstream exposes exactly two primitives: the ordered list of newest
//! story ids, and a single-item lookup by id. There is no pagination,
//! filtering, or bulk fetch on the remote side; everything richer is built
//! on top by the service layer.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::HackerNewsConfig;
use crate::errors::{AppResult, SourceError};
use crate::models::{HnItem, Story};

/// Read-only access to the upstream item store
///
/// The two operations deliberately differ in failure behavior. A single
/// item that cannot be fetched or decoded resolves to `None` and is
/// indistinguishable from an item that does not exist, so callers can
/// treat all of these as "not currently visible". The index fetch is
/// foundational and propagates its failures instead; silently returning an
/// empty list would misrepresent totals downstream.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Fetch one item and resolve it into a story, or `None` when the id
    /// does not resolve to a visible story.
    async fn fetch_item(&self, id: u64) -> Option<Story>;

    /// Fetch the ordered list of newest candidate ids.
    async fn fetch_index(&self) -> AppResult<Vec<u64>>;
}

/// HTTP client for the Hacker News Firebase API
pub struct HnClient {
    client: Client,
    base_url: String,
}

impl HnClient {
    pub fn new(config: &HackerNewsConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ItemStore for HnClient {
    async fn fetch_item(&self, id: u64) -> Option<Story> {
        let url = format!("{}/item/{}.json", self.base_url, id);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("Item fetch failed for {}: {}", id, e);
                return None;
            }
        };

        if !response.status().is_success() {
            debug!("Item fetch for {} returned HTTP {}", id, response.status());
            return None;
        }

        // The upstream answers unknown ids with a JSON `null` body
        let item: Option<HnItem> = match response.json().await {
            Ok(item) => item,
            Err(e) => {
                debug!("Item decode failed for {}: {}", id, e);
                return None;
            }
        };

        item.and_then(Story::from_item)
    }

    async fn fetch_index(&self) -> AppResult<Vec<u64>> {
        let url = format!("{}/newstories.json", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::fetch_failed(&url, e.to_string()))?;

        if !response.status().is_success() {
            warn!("Index fetch returned HTTP {}", response.status());
            return Err(SourceError::Http {
                status: response.status().as_u16(),
                message: "story index fetch failed".to_string(),
            }
            .into());
        }

        let ids = response
            .json::<Vec<u64>>()
            .await
            .map_err(|e| SourceError::decode_error(&url, e.to_string()))?;

        Ok(ids)
    }
}
