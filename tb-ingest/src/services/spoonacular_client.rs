//! Spoonacular recipe API client
//!
//! Structured lookup: search by name, analyzed instructions by id, and recipe
//! extraction from an arbitrary URL.

use super::http::{build_client, read_json};
use crate::types::{ExtractedRecipe, InstructionStep, RecipeLookup, RecipeSearch, ServiceError};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

const SPOONACULAR_BASE_URL: &str = "https://api.spoonacular.com";

/// One block of analyzed instructions
#[derive(Debug, Deserialize)]
struct InstructionBlock {
    #[serde(default)]
    steps: Vec<InstructionStep>,
}

/// Spoonacular API client
pub struct SpoonacularClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl SpoonacularClient {
    pub fn new(api_key: String) -> Result<Self, ServiceError> {
        Ok(Self {
            http_client: build_client(false)?,
            api_key,
            base_url: SPOONACULAR_BASE_URL.to_string(),
        })
    }

    /// Point the client at another host (proxies, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ServiceError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Querying Spoonacular API");

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        read_json(response).await
    }
}

#[async_trait]
impl RecipeLookup for SpoonacularClient {
    async fn search_by_name(&self, name: &str) -> Result<RecipeSearch, ServiceError> {
        self.get("/recipes/complexSearch", &[("query", name)]).await
    }

    /// Steps of the first analyzed instruction block
    async fn instructions_by_id(&self, id: i64) -> Result<Vec<InstructionStep>, ServiceError> {
        let blocks: Vec<InstructionBlock> = self
            .get(&format!("/recipes/{}/analyzedInstructions", id), &[])
            .await?;

        first_block_steps(blocks, id)
    }

    async fn extract_from_url(&self, url: &str) -> Result<ExtractedRecipe, ServiceError> {
        self.get("/recipes/extract", &[("url", url)]).await
    }
}

/// Steps of the first block; a recipe without blocks is malformed
fn first_block_steps(
    blocks: Vec<InstructionBlock>,
    id: i64,
) -> Result<Vec<InstructionStep>, ServiceError> {
    blocks
        .into_iter()
        .next()
        .map(|block| block.steps)
        .ok_or_else(|| ServiceError::Malformed(format!("no analyzed instructions for recipe {}", id)))
}
