//! HTTP registry client
//!
//! Blocking client for a Notion-style database API: paginated database
//! queries and single-page fetches, paced by a [`RateLimiter`] and
//! fronted by a [`ResponseCache`].

use crate::cache::{ResponseCache, DEFAULT_DIRECTORY, DEFAULT_TTL};
use crate::error::RegistryError;
use crate::rate_limit::{RateLimiter, DEFAULT_RATE_LIMIT};
use crate::source::RegistrySource;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::CONTENT_TYPE;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";

/// Default protocol version header value
pub const DEFAULT_API_VERSION: &str = "2022-06-28";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Records requested per page
pub const PAGE_SIZE: u32 = 100;

/// Client settings
#[derive(Clone)]
pub struct ClientConfig {
    pub api_token: String,
    pub base_url: String,
    pub version: String,
    pub timeout: Duration,
    /// Requests per second; 0 disables pacing
    pub rate_limit: u32,
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
    pub cache_directory: PathBuf,
}

impl ClientConfig {
    /// Settings with defaults for everything but the token
    #[must_use]
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
            rate_limit: DEFAULT_RATE_LIMIT,
            cache_enabled: true,
            cache_ttl: DEFAULT_TTL,
            cache_directory: PathBuf::from(DEFAULT_DIRECTORY),
        }
    }

    /// Override the API base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the request rate ceiling
    #[must_use]
    pub fn with_rate_limit(mut self, per_second: u32) -> Self {
        self.rate_limit = per_second;
        self
    }

    /// Cache responses under `directory` for `ttl`
    #[must_use]
    pub fn with_cache(mut self, directory: impl Into<PathBuf>, ttl: Duration) -> Self {
        self.cache_enabled = true;
        self.cache_directory = directory.into();
        self.cache_ttl = ttl;
        self
    }

    /// Never cache responses
    #[must_use]
    pub fn without_cache(mut self) -> Self {
        self.cache_enabled = false;
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("version", &self.version)
            .field("timeout", &self.timeout)
            .field("rate_limit", &self.rate_limit)
            .field("cache_enabled", &self.cache_enabled)
            .field("cache_ttl", &self.cache_ttl)
            .field("cache_directory", &self.cache_directory)
            .finish()
    }
}

/// Rate-limited, cached registry client
#[derive(Debug)]
pub struct RegistryClient {
    http: Client,
    config: ClientConfig,
    limiter: RateLimiter,
    cache: ResponseCache,
}

impl RegistryClient {
    /// Build a client
    ///
    /// # Errors
    /// Returns [`RegistryError::RequestFailed`] if the HTTP client cannot
    /// be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, RegistryError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RegistryError::RequestFailed {
                status: None,
                message: format!("failed to build HTTP client: {e}"),
            })?;
        let cache = if config.cache_enabled {
            ResponseCache::new(&config.cache_directory, config.cache_ttl)
        } else {
            ResponseCache::disabled()
        };
        Ok(Self {
            http,
            limiter: RateLimiter::new(config.rate_limit),
            cache,
            config,
        })
    }

    /// Response cache
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Pace, send, and decode one request
    fn execute(&self, request: RequestBuilder, resource: &str) -> Result<Value, RegistryError> {
        self.limiter.wait();

        let response = request
            .bearer_auth(&self.config.api_token)
            .header("Notion-Version", &self.config.version)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    RegistryError::Timeout(resource.to_string())
                } else {
                    RegistryError::RequestFailed {
                        status: None,
                        message: format!("{resource}: {e}"),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RegistryError::from_status(status.as_u16(), body, resource));
        }

        response
            .json::<Value>()
            .map_err(|e| RegistryError::Decode(format!("{resource}: {e}")))
    }
}

impl RegistrySource for RegistryClient {
    fn query(&self, collection_id: &str, filter: Option<Value>) -> Result<Vec<Value>, RegistryError> {
        let filter_desc = filter.as_ref().map_or_else(|| "null".to_string(), Value::to_string);
        let key = ResponseCache::key(&format!("db_{collection_id}_{filter_desc}"));
        if let Some(Value::Array(cached)) = self.cache.get(&key) {
            return Ok(cached);
        }

        let resource = format!("database {collection_id}");
        let url = self.url(&format!("databases/{collection_id}/query"));
        let mut body = json!({ "page_size": PAGE_SIZE });
        if let Some(filter) = filter {
            body["filter"] = filter;
        }

        let mut results = Vec::new();
        loop {
            let page = self.execute(self.http.post(&url).json(&body), &resource)?;
            if let Some(Value::Array(items)) = page.get("results") {
                results.extend(items.iter().cloned());
            }

            let has_more = page.get("has_more").and_then(Value::as_bool).unwrap_or(false);
            let next_cursor = page.get("next_cursor").and_then(Value::as_str);
            match (has_more, next_cursor) {
                (true, Some(cursor)) => {
                    tracing::debug!(collection_id, cursor, fetched = results.len(), "fetching next page");
                    body["start_cursor"] = Value::String(cursor.to_string());
                }
                (true, None) => {
                    tracing::warn!(collection_id, "has_more without next_cursor; stopping pagination");
                    break;
                }
                (false, _) => break,
            }
        }

        self.cache.put(&key, &Value::Array(results.clone()));
        Ok(results)
    }

    fn get(&self, record_id: &str) -> Result<Value, RegistryError> {
        let key = ResponseCache::key(&format!("page_{record_id}"));
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let url = self.url(&format!("pages/{record_id}"));
        let record = self.execute(self.http.get(&url), &format!("page {record_id}"))?;
        self.cache.put(&key, &record);
        Ok(record)
    }

    fn clear_cache(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = ClientConfig::new("secret");
        assert_eq!(config.base_url, "https://api.notion.com/v1");
        assert_eq!(config.version, "2022-06-28");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.rate_limit, 3);
        assert!(config.cache_enabled);
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.cache_directory, PathBuf::from(".golden-thread-cache"));
    }

    #[test]
    fn debug_redacts_token() {
        let rendered = format!("{:?}", ClientConfig::new("secret-token"));
        assert!(!rendered.contains("secret-token"));
    }

    #[test]
    fn url_joins_without_double_slash() {
        let client = RegistryClient::new(
            ClientConfig::new("t").with_base_url("http://localhost:1/v1/").without_cache(),
        )
        .unwrap();
        assert_eq!(client.url("pages/abc"), "http://localhost:1/v1/pages/abc");
    }

    #[test]
    fn cache_follows_config() {
        let dir = tempfile::tempdir().unwrap();
        let cached = RegistryClient::new(
            ClientConfig::new("t").with_cache(dir.path(), Duration::from_secs(5)),
        )
        .unwrap();
        assert!(cached.cache().is_enabled());
        assert_eq!(cached.cache().directory(), dir.path());

        let uncached = RegistryClient::new(ClientConfig::new("t").without_cache()).unwrap();
        assert!(!uncached.cache().is_enabled());
    }
}
