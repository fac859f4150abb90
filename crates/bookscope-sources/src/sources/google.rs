use std::time::Duration;

use async_trait::async_trait;
use bookscope_core::SourceTag;
use bookscope_core::config::GoogleConfig;
use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::error::Result;
use crate::http::{RateLimitedClient, USER_AGENT};
use crate::sources::{BookSource, items};

/// Upper bound the volumes endpoint accepts for `maxResults`.
const MAX_PAGE_SIZE: usize = 40;

/// Google Books `volumes` search.
pub struct GoogleBooksSource {
    client: RateLimitedClient,
    base_url: String,
    api_key: Option<String>,
    default_limit: usize,
}

impl GoogleBooksSource {
    pub fn with_params(base_url: &str, min_interval: Duration, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            client: RateLimitedClient::new(min_interval, 2, USER_AGENT)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            default_limit: MAX_PAGE_SIZE,
        })
    }

    /// Reads the API key from the environment variable named in the config.
    pub fn from_config(config: &GoogleConfig, default_limit: usize) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).ok();
        let mut source = Self::with_params(
            &config.base_url,
            Duration::from_millis(config.min_interval_ms),
            api_key,
        )?;
        source.default_limit = default_limit.clamp(1, MAX_PAGE_SIZE);
        Ok(source)
    }

    fn volumes_url(&self, query: &str, limit: usize) -> String {
        let mut url = format!(
            "{}/volumes?q={}&maxResults={}",
            self.base_url,
            urlencoding::encode(query),
            limit.clamp(1, MAX_PAGE_SIZE)
        );
        if let Some(key) = &self.api_key {
            url.push_str("&key=");
            url.push_str(&urlencoding::encode(key));
        }
        url
    }
}

#[async_trait]
impl BookSource for GoogleBooksSource {
    fn tag(&self) -> SourceTag {
        SourceTag::Google
    }

    fn default_limit(&self) -> usize {
        self.default_limit
    }

    async fn search_raw(&self, query: &str, limit: usize) -> Result<Vec<Value>> {
        if limit == 0 || query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let body: Value = self
            .client
            .get_json(&self.volumes_url(query, limit), HeaderMap::new())
            .await?;
        Ok(items(body))
    }
}
