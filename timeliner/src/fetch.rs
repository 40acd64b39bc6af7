use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::NewsError;
use common::NewsConfig;

const DEFAULT_ENDPOINT: &str = "https://newsapi.org/v2/everything";
const DEFAULT_API_KEY_ENV: &str = "NEWSAPI_KEY";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// One normalized news item. Every field is always present; values the source
/// omits normalize to the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub headline: String,
    pub summary: String,
    pub url: String,
    pub published: String,
    pub source: String,
}

/// Raw payload shapes as returned by the search API.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
    source: Option<RawSource>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSource {
    name: Option<String>,
}

impl From<RawArticle> for Article {
    fn from(raw: RawArticle) -> Self {
        // summary falls back from description to the longer content field;
        // an empty description counts as missing
        let summary = non_empty(raw.description)
            .or_else(|| non_empty(raw.content))
            .unwrap_or_default();
        Article {
            headline: raw.title.unwrap_or_default(),
            summary,
            url: raw.url.unwrap_or_default(),
            published: raw.published_at.unwrap_or_default(),
            source: raw.source.and_then(|s| s.name).unwrap_or_default(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Client for the news search API. The credential is injected at construction
/// time; nothing in here reads process environment on the request path.
#[derive(Debug)]
pub struct NewsClient {
    endpoint: String,
    api_key: String,
    client: Client,
}

impl NewsClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NewsError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Timeliner/0.1.0")
            .build()
            .map_err(|e| NewsError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Build a client from the `[news]` config section, resolving the API key
    /// from the environment variable the config names. A missing or empty key
    /// fails here, before any network activity.
    pub fn from_config(config: &NewsConfig) -> Result<Self, NewsError> {
        let env_name = config.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV);
        let api_key = std::env::var(env_name)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                NewsError::Configuration(format!(
                    "search API key env var '{}' is not set",
                    env_name
                ))
            })?;
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let timeout = Duration::from_secs(config.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS));
        Self::new(endpoint, api_key, timeout)
    }

    /// Fetch up to `limit` English-language articles for `topic`, sorted by
    /// relevancy. One outbound request, no retries; results keep the payload
    /// order.
    pub async fn fetch(&self, topic: &str, limit: u32) -> Result<Vec<Article>, NewsError> {
        let page_size = limit.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", topic),
                ("pageSize", page_size.as_str()),
                ("language", "en"),
                ("sortBy", "relevancy"),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NewsError::Fetch(format!(
                "search API returned {}: {}",
                status, body
            )));
        }

        let payload: SearchResponse = response
            .json()
            .await
            .map_err(|e| NewsError::Fetch(format!("failed to decode search payload: {e}")))?;

        debug!(topic, count = payload.articles.len(), "search returned articles");
        Ok(payload.articles.into_iter().map(Article::from).collect())
    }
}
