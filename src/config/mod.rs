use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub web: WebConfig,
    pub hackernews: HackerNewsConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

/// Upstream Hacker News API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HackerNewsConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

/// Cache lifetimes and sizing knobs
///
/// `search_prefix_len` bounds how many ids from the head of the index are
/// resolved to back keyword search; `overfetch_factor` is the multiplier
/// applied to the requested page size when resolving a direct page, to
/// compensate for ids that drop out as non-stories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub item_ttl_seconds: u64,
    pub index_ttl_seconds: u64,
    pub search_ttl_seconds: u64,
    pub search_prefix_len: usize,
    pub overfetch_factor: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web: WebConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            hackernews: HackerNewsConfig {
                base_url: "https://hacker-news.firebaseio.com/v0".to_string(),
                timeout_seconds: 30,
                user_agent: "HN-Aggregator/1.0".to_string(),
            },
            cache: CacheConfig {
                item_ttl_seconds: 300,
                index_ttl_seconds: 300,
                search_ttl_seconds: 600,
                search_prefix_len: 200,
                overfetch_factor: 2,
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());

        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(&config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(&config_file, contents)?;
            Ok(default_config)
        }
    }
}
