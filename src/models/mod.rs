use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// The item kind eligible to become a [`Story`]; every other kind is dropped.
pub const STORY_KIND: &str = "story";

/// Raw item record as returned by the Hacker News item endpoint
///
/// Decoded straight from the remote JSON and never mutated. Most fields are
/// optional or defaulted because the upstream omits them for deleted and
/// partial items.
#[derive(Debug, Clone, Deserialize)]
pub struct HnItem {
    pub id: u64,
    pub title: Option<String>,
    pub url: Option<String>,
    pub by: Option<String>,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub descendants: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub kids: Option<Vec<u64>>,
}

/// A resolved, cacheable story
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: u64,
    pub title: String,
    pub url: Option<String>,
    pub author: String,
    pub published_at: DateTime<Utc>,
    pub score: i64,
    pub comments_count: i64,
}

impl Story {
    /// Convert a raw item into a story, or `None` when the item kind does
    /// not qualify. Missing titles and authors get placeholder values so a
    /// story is always presentable.
    pub fn from_item(item: HnItem) -> Option<Self> {
        if item.kind != STORY_KIND {
            return None;
        }

        let published_at = Utc
            .timestamp_opt(item.time, 0)
            .single()
            .unwrap_or(DateTime::UNIX_EPOCH);

        Some(Self {
            id: item.id,
            title: item.title.unwrap_or_else(|| "No title".to_string()),
            url: item.url,
            author: item.by.unwrap_or_else(|| "Unknown".to_string()),
            published_at,
            score: item.score,
            comments_count: item.descendants,
        })
    }

    /// Case-insensitive containment match against title and author
    pub fn matches_term(&self, lowercase_term: &str) -> bool {
        self.title.to_lowercase().contains(lowercase_term)
            || self.author.to_lowercase().contains(lowercase_term)
    }
}

/// One page of results plus paging metadata
///
/// `total_count` semantics depend on how the page was produced: a direct
/// page reports the length of the full candidate id list (an upper bound,
/// since unresolved ids may drop out), while a search page reports the
/// exact match count within the materialized prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total_count: usize,
    pub page_number: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total_count: usize, page_number: usize, page_size: usize) -> Self {
        let total_pages = total_count.div_ceil(page_size);
        Self {
            items,
            total_count,
            page_number,
            page_size,
            total_pages,
        }
    }
}
