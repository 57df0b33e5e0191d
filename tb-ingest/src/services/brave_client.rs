//! Brave Search API client (web search fallback)

use super::http::{build_client, read_json};
use crate::types::{ServiceError, WebResult, WebSearch};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

const BRAVE_SEARCH_URL: &str = "https://api.search.brave.com/res/v1/web/search";
/// Largest `count` the API accepts
const MAX_COUNT: u32 = 20;

#[derive(Debug, Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWebSection>,
}

#[derive(Debug, Deserialize)]
struct BraveWebSection {
    #[serde(default)]
    results: Vec<WebResult>,
}

/// Brave web search client
pub struct BraveSearchClient {
    http_client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl BraveSearchClient {
    pub fn new(api_key: String) -> Result<Self, ServiceError> {
        Ok(Self {
            http_client: build_client(false)?,
            api_key,
            endpoint: BRAVE_SEARCH_URL.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl WebSearch for BraveSearchClient {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<WebResult>, ServiceError> {
        let count = max_results.clamp(1, MAX_COUNT).to_string();
        debug!(query = %query, count = %count, "Querying Brave Search API");

        let response = self
            .http_client
            .get(&self.endpoint)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", self.api_key.as_str())
            .query(&[("q", query), ("count", count.as_str())])
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let body: BraveResponse = read_json(response).await?;
        let mut results = body.web.map(|web| web.results).unwrap_or_default();
        results.truncate(max_results as usize);
        Ok(results)
    }
}
