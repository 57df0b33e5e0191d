//! Google Trends "related queries" client
//!
//! Three requests per discovery:
//! 1. Home page, to obtain the session cookie the API expects
//! 2. `explore`, which returns the widget list for the seed keyword
//! 3. `widgetdata/relatedsearches` for the `RELATED_QUERIES` widget
//!
//! Both API responses start with an anti-XSSI prefix (`)]}'`) that is
//! stripped before decoding. Each request waits on the shared [`RateGate`].

use super::http::{build_client, read_body};
use super::rate_gate::RateGate;
use crate::types::{ServiceError, TrendSource, TrendingRecipe};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

const TRENDS_BASE_URL: &str = "https://trends.google.com";
const RELATED_QUERIES_WIDGET: &str = "RELATED_QUERIES";
const HOST_LANGUAGE: &str = "en-US";
/// Timezone offset in minutes, as sent by the web UI
const TIMEZONE_OFFSET: &str = "360";
/// Position of the "rising" list; the first ranked list is "top"
const RISING_LIST_INDEX: usize = 1;

#[derive(Debug, Deserialize)]
struct ExploreResponse {
    widgets: Vec<Widget>,
}

#[derive(Debug, Deserialize)]
struct Widget {
    id: String,
    token: String,
    request: Value,
}

#[derive(Debug, Deserialize)]
struct RelatedSearchesResponse {
    default: RankedLists,
}

#[derive(Debug, Deserialize)]
struct RankedLists {
    #[serde(rename = "rankedList", default)]
    ranked_list: Vec<RankedList>,
}

#[derive(Debug, Deserialize)]
struct RankedList {
    #[serde(rename = "rankedKeyword", default)]
    ranked_keyword: Vec<RankedKeyword>,
}

#[derive(Debug, Deserialize)]
struct RankedKeyword {
    query: String,
    value: i64,
}

/// Google Trends client
pub struct TrendsClient {
    http_client: reqwest::Client,
    base_url: String,
    gate: Arc<RateGate>,
}

impl TrendsClient {
    pub fn new(gate: Arc<RateGate>) -> Result<Self, ServiceError> {
        Ok(Self {
            http_client: build_client(true)?,
            base_url: TRENDS_BASE_URL.to_string(),
            gate,
        })
    }

    /// Point the client at another host (proxies, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn fetch(&self, path: &str, query: &[(&str, &str)]) -> Result<String, ServiceError> {
        let url = format!("{}{}", self.base_url, path);
        self.gate.admit().await;
        debug!(url = %url, "Querying Google Trends");

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        read_body(response).await
    }

    async fn related_queries_widget(
        &self,
        seed_keyword: &str,
        timeframe: &str,
        region: &str,
    ) -> Result<Widget, ServiceError> {
        let request = json!({
            "comparisonItem": [{ "keyword": seed_keyword, "time": timeframe, "geo": region }],
            "category": 0,
            "property": "",
        })
        .to_string();

        let body = self
            .fetch(
                "/trends/api/explore",
                &[("hl", HOST_LANGUAGE), ("tz", TIMEZONE_OFFSET), ("req", request.as_str())],
            )
            .await?;

        let explore: ExploreResponse = decode_prefixed(&body)?;
        explore
            .widgets
            .into_iter()
            .find(|w| w.id == RELATED_QUERIES_WIDGET)
            .ok_or_else(|| ServiceError::Malformed("explore response has no related queries widget".into()))
    }
}

#[async_trait]
impl TrendSource for TrendsClient {
    async fn rising_queries(
        &self,
        seed_keyword: &str,
        timeframe: &str,
        region: &str,
    ) -> Result<Vec<TrendingRecipe>, ServiceError> {
        self.fetch("/", &[("geo", region)]).await?;

        let widget = self
            .related_queries_widget(seed_keyword, timeframe, region)
            .await?;

        let request = widget.request.to_string();
        let body = self
            .fetch(
                "/trends/api/widgetdata/relatedsearches",
                &[
                    ("hl", HOST_LANGUAGE),
                    ("tz", TIMEZONE_OFFSET),
                    ("req", request.as_str()),
                    ("token", widget.token.as_str()),
                ],
            )
            .await?;

        let related: RelatedSearchesResponse = decode_prefixed(&body)?;
        let rising = rising_from(related);

        info!(
            seed_keyword = %seed_keyword,
            timeframe = %timeframe,
            region = %region,
            count = rising.len(),
            "Retrieved rising queries from Google Trends"
        );

        Ok(rising)
    }
}

/// Rising list in source order; absent when Trends has too little data
fn rising_from(related: RelatedSearchesResponse) -> Vec<TrendingRecipe> {
    related
        .default
        .ranked_list
        .into_iter()
        .nth(RISING_LIST_INDEX)
        .map(|list| {
            list.ranked_keyword
                .into_iter()
                .map(|k| TrendingRecipe::new(k.query, k.value))
                .collect()
        })
        .unwrap_or_default()
}

/// Decode a body carrying the anti-XSSI prefix
fn decode_prefixed<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ServiceError> {
    let start = body
        .find('{')
        .ok_or_else(|| ServiceError::Parse("response contains no JSON object".into()))?;
    serde_json::from_str(&body[start..]).map_err(|e| ServiceError::Parse(e.to_string()))
}
