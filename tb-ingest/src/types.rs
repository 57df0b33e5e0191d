//! Core types and collaborator traits
//!
//! The pipeline only talks to trend, recipe and search services through the
//! traits defined here. HTTP adapters live in `services`; tests use stubs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

// ============================================================================
// Pipeline data
// ============================================================================

/// Recipe surfaced by trend discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendingRecipe {
    pub name: String,
    /// Rise in search interest, in percent
    pub growth_pct: i64,
}

impl TrendingRecipe {
    pub fn new(name: impl Into<String>, growth_pct: i64) -> Self {
        Self {
            name: name.into(),
            growth_pct,
        }
    }
}

/// How a recipe's ingredient list was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionStatus {
    /// Structured lookup found the recipe
    ResolvedDirect,
    /// Found through web search + URL extraction
    ResolvedFallback,
    /// No source knew the recipe
    Empty,
    /// A collaborator call failed
    Failed,
}

/// Outcome of resolving one trending recipe
///
/// This is the journal record. The stage artifacts only carry the
/// `RecipeRecord` projection of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRecipe {
    pub name: String,
    #[serde(rename = "growth")]
    pub growth_pct: i64,
    pub ingredients: Vec<String>,
    pub status: ResolutionStatus,
    /// Error text, only for `Failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    pub resolved_at: DateTime<Utc>,
}

impl ResolvedRecipe {
    pub fn new(recipe: &TrendingRecipe, status: ResolutionStatus, ingredients: Vec<String>) -> Self {
        Self {
            name: recipe.name.clone(),
            growth_pct: recipe.growth_pct,
            ingredients,
            status,
            failure: None,
            resolved_at: Utc::now(),
        }
    }

    pub fn failed(recipe: &TrendingRecipe, cause: impl Into<String>) -> Self {
        Self {
            failure: Some(cause.into()),
            ..Self::new(recipe, ResolutionStatus::Failed, Vec::new())
        }
    }

    pub fn record(&self) -> RecipeRecord {
        RecipeRecord {
            name: self.name.clone(),
            growth: self.growth_pct,
            ingredients: self.ingredients.clone(),
        }
    }
}

/// Row of the combined ingredient artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeRecord {
    pub name: String,
    pub growth: i64,
    pub ingredients: Vec<String>,
}

/// Catalog products matched for one recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeProducts {
    pub name: String,
    pub growth: i64,
    pub product_ids: BTreeSet<i64>,
}

/// Best catalog product for one ingredient string
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientMatch {
    pub ingredient_text: String,
    /// Absent only when the catalog is empty
    pub product_id: Option<i64>,
    pub score: f64,
}

// ============================================================================
// Catalog
// ============================================================================

/// One purchasable product
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogProduct {
    pub product_id: i64,
    pub product_name: String,
}

/// Products in load order, unique by id
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<CatalogProduct>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate product ids
    pub fn new(products: Vec<CatalogProduct>) -> tb_common::Result<Self> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if !seen.insert(product.product_id) {
                return Err(tb_common::Error::InvalidInput(format!(
                    "duplicate product_id {} in catalog",
                    product.product_id
                )));
            }
        }
        Ok(Self { products })
    }

    pub fn products(&self) -> &[CatalogProduct] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

// ============================================================================
// Collaborator responses
// ============================================================================

/// Structured lookup search response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeSearch {
    #[serde(rename = "totalResults")]
    pub total_results: u64,
    #[serde(default)]
    pub results: Vec<RecipeSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecipeSummary {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
}

/// One step of a recipe's analyzed instructions
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstructionStep {
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default)]
    pub ingredients: Vec<NamedIngredient>,
}

/// Ingredient reference carrying at least a name
#[derive(Debug, Clone, Deserialize)]
pub struct NamedIngredient {
    pub name: String,
}

/// Recipe parsed from an arbitrary web page
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedRecipe {
    #[serde(rename = "extendedIngredients")]
    pub extended_ingredients: Vec<NamedIngredient>,
}

/// One ranked web search hit
#[derive(Debug, Clone, Deserialize)]
pub struct WebResult {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

// ============================================================================
// Collaborator traits
// ============================================================================

/// Errors from external collaborators
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// Response decoded but violated the expected shape
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Trend discovery
///
/// One call may issue several requests; implementations pass each of them
/// through the shared rate gate themselves.
#[async_trait]
pub trait TrendSource: Send + Sync {
    /// Rising queries related to `seed_keyword`, in source order
    async fn rising_queries(
        &self,
        seed_keyword: &str,
        timeframe: &str,
        region: &str,
    ) -> Result<Vec<TrendingRecipe>, ServiceError>;
}

/// Structured recipe service
#[async_trait]
pub trait RecipeLookup: Send + Sync {
    async fn search_by_name(&self, name: &str) -> Result<RecipeSearch, ServiceError>;

    /// Steps of the recipe's instructions, in order
    async fn instructions_by_id(&self, id: i64) -> Result<Vec<InstructionStep>, ServiceError>;

    async fn extract_from_url(&self, url: &str) -> Result<ExtractedRecipe, ServiceError>;
}

/// Generic web search
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<WebResult>, ServiceError>;
}
