//! Story aggregation service
//!
//! This is the read-through caching core of the application. It fronts the
//! one-item-at-a-time upstream API and assembles paginated, optionally
//! keyword-filtered pages out of it while keeping remote traffic bounded:
//!
//! - per-item results (including confirmed "not a story" outcomes) are
//!   cached under the item TTL, so known ids and known-dead ids alike are
//!   not re-fetched on every page;
//! - the candidate id index is cached under its own TTL and replaced
//!   wholesale on expiry;
//! - keyword search, which has no remote equivalent, runs over a
//!   materialized prefix of resolved stories cached in a single shared
//!   slot with a longer TTL, so consecutive search requests only differ
//!   in the in-memory filter step.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::cache::{Clock, SystemClock, TtlCache, TtlCell};
use crate::client::ItemStore;
use crate::config::CacheConfig;
use crate::errors::AppResult;
use crate::models::{PagedResult, Story};

/// Read-through caching aggregator over an [`ItemStore`]
///
/// All state lives in the caches owned by this instance; individual
/// requests are stateless given their contents.
pub struct StoryService {
    store: Arc<dyn ItemStore>,
    story_cache: TtlCache<u64, Option<Story>>,
    index_cache: TtlCell<Arc<Vec<u64>>>,
    search_cache: TtlCell<Arc<Vec<Story>>>,
    search_prefix_len: usize,
    overfetch_factor: usize,
}

impl StoryService {
    pub fn new(store: Arc<dyn ItemStore>, config: &CacheConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    /// Create a service whose cache expiry follows the given clock.
    pub fn with_clock(
        store: Arc<dyn ItemStore>,
        config: &CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            story_cache: TtlCache::with_clock(
                Duration::from_secs(config.item_ttl_seconds),
                clock.clone(),
            ),
            index_cache: TtlCell::with_clock(
                Duration::from_secs(config.index_ttl_seconds),
                clock.clone(),
            ),
            search_cache: TtlCell::with_clock(
                Duration::from_secs(config.search_ttl_seconds),
                clock,
            ),
            search_prefix_len: config.search_prefix_len,
            overfetch_factor: config.overfetch_factor,
        }
    }

    /// One page of the newest stories, optionally filtered by a search term.
    ///
    /// An empty term is the same as no term. Only an index fetch failure
    /// errors the request; unresolvable individual items just shorten the
    /// page.
    pub async fn newest_stories(
        &self,
        page_number: usize,
        page_size: usize,
        search: Option<&str>,
    ) -> AppResult<PagedResult<Story>> {
        match search.filter(|term| !term.is_empty()) {
            Some(term) => self.search_page(page_number, page_size, term).await,
            None => self.direct_page(page_number, page_size).await,
        }
    }

    /// Resolve one story by id through the same cache as page assembly.
    pub async fn story_by_id(&self, id: u64) -> Option<Story> {
        self.resolve_story(id).await
    }

    /// Direct mode: resolve a window of the id list and slice it.
    ///
    /// The window is `overfetch_factor` times the page size so that ids
    /// dropping out as non-stories usually still leave a full page. When
    /// they do not, the page simply comes back short; there is no second
    /// expansion pass. The reported total is the raw candidate count, an
    /// upper bound on confirmed stories.
    async fn direct_page(
        &self,
        page_number: usize,
        page_size: usize,
    ) -> AppResult<PagedResult<Story>> {
        let ids = self.newest_ids().await?;

        let start = page_number.saturating_sub(1).saturating_mul(page_size);
        let end = usize::min(
            start.saturating_add(page_size.saturating_mul(self.overfetch_factor)),
            ids.len(),
        );
        let window = if start < end { &ids[start..end] } else { &[][..] };

        let mut stories = self.resolve_many(window).await;
        stories.truncate(page_size);

        Ok(PagedResult::new(stories, ids.len(), page_number, page_size))
    }

    /// Search mode: filter the materialized prefix in memory and slice.
    ///
    /// Matching is containment over lowercased title and author. The total
    /// is exact but bounded by the prefix; stories past it are never
    /// searchable.
    async fn search_page(
        &self,
        page_number: usize,
        page_size: usize,
        term: &str,
    ) -> AppResult<PagedResult<Story>> {
        let prefix = self.materialized_prefix().await?;
        let term = term.to_lowercase();

        let matches: Vec<&Story> = prefix
            .iter()
            .filter(|story| story.matches_term(&term))
            .collect();
        let total_count = matches.len();

        let items: Vec<Story> = matches
            .into_iter()
            .skip(page_number.saturating_sub(1).saturating_mul(page_size))
            .take(page_size)
            .cloned()
            .collect();

        Ok(PagedResult::new(items, total_count, page_number, page_size))
    }

    /// Resolve a batch of ids, dropping the ones that are not stories.
    ///
    /// Cache misses fan out concurrently and join at a single barrier;
    /// the output preserves input order because `join_all` yields results
    /// in future order, never completion order. Dropping the returned
    /// future cancels all in-flight lookups.
    async fn resolve_many(&self, ids: &[u64]) -> Vec<Story> {
        let lookups = ids.iter().map(|&id| self.resolve_story(id));
        join_all(lookups).await.into_iter().flatten().collect()
    }

    /// Resolve one id through the item cache.
    ///
    /// The cached value may itself be the absent marker, which
    /// short-circuits without a remote call. Every fetch outcome is
    /// cached, including absence, so known-dead ids are not re-fetched
    /// until their entry expires.
    async fn resolve_story(&self, id: u64) -> Option<Story> {
        if let Some(cached) = self.story_cache.get(&id) {
            return cached;
        }

        let story = self.store.fetch_item(id).await;
        self.story_cache.insert(id, story.clone());
        story
    }

    /// The full candidate id list, refreshed through the index cache.
    async fn newest_ids(&self) -> AppResult<Arc<Vec<u64>>> {
        if let Some(ids) = self.index_cache.get().await {
            return Ok(ids);
        }

        let ids = Arc::new(self.store.fetch_index().await?);
        debug!("Refreshed story index with {} candidate ids", ids.len());
        self.index_cache.set(ids.clone()).await;
        Ok(ids)
    }

    /// The resolved head of the id list backing keyword search.
    ///
    /// One slot shared by all search terms; recomputing it is the
    /// expensive part, filtering is per-request.
    async fn materialized_prefix(&self) -> AppResult<Arc<Vec<Story>>> {
        if let Some(prefix) = self.search_cache.get().await {
            return Ok(prefix);
        }

        let ids = self.newest_ids().await?;
        let head = &ids[..usize::min(self.search_prefix_len, ids.len())];
        let stories = Arc::new(self.resolve_many(head).await);
        debug!(
            "Materialized search prefix: {} stories from {} ids",
            stories.len(),
            head.len()
        );
        self.search_cache.set(stories.clone()).await;
        Ok(stories)
    }
}
