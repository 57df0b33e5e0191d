//! Test collaborators and fixtures
//!
//! Stub trend, lookup and search services that answer from in-memory tables
//! and count every call they receive.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tb_common::config::ArtifactLayout;
use tb_ingest::services::RateGate;
use tb_ingest::types::{
    ExtractedRecipe, InstructionStep, NamedIngredient, RecipeLookup, RecipeSearch, RecipeSummary,
    ServiceError, TrendSource, TrendingRecipe, WebResult, WebSearch,
};
use tb_ingest::workflow::{CheckpointStore, Pipeline, PipelineSettings};

fn named(names: &[&str]) -> Vec<NamedIngredient> {
    names
        .iter()
        .map(|n| NamedIngredient { name: n.to_string() })
        .collect()
}

// ============================================================================
// Trend source
// ============================================================================

pub struct StubTrends {
    recipes: Vec<TrendingRecipe>,
    fail: bool,
    pub calls: AtomicUsize,
}

impl StubTrends {
    pub fn new(recipes: &[(&str, i64)]) -> Self {
        Self {
            recipes: recipes
                .iter()
                .map(|(name, growth)| TrendingRecipe::new(*name, *growth))
                .collect(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrendSource for StubTrends {
    async fn rising_queries(
        &self,
        _seed_keyword: &str,
        _timeframe: &str,
        _region: &str,
    ) -> Result<Vec<TrendingRecipe>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ServiceError::Network("trends unavailable".to_string()));
        }
        Ok(self.recipes.clone())
    }
}

// ============================================================================
// Recipe lookup
// ============================================================================

#[derive(Default)]
pub struct StubLookup {
    /// name → (recipe id, steps of ingredient names)
    recipes: HashMap<String, (i64, Vec<Vec<String>>)>,
    /// url → extracted ingredient names, or `None` to fail extraction
    pages: HashMap<String, Option<Vec<String>>>,
    /// name → reported total with an empty results list
    counted_but_unlisted: HashMap<String, u64>,
    pub search_calls: AtomicUsize,
    pub instruction_calls: AtomicUsize,
    pub extract_calls: AtomicUsize,
}

impl StubLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recipe(mut self, name: &str, id: i64, steps: &[&[&str]]) -> Self {
        let steps = steps
            .iter()
            .map(|step| step.iter().map(|s| s.to_string()).collect())
            .collect();
        self.recipes.insert(name.to_string(), (id, steps));
        self
    }

    pub fn with_page(mut self, url: &str, ingredients: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            Some(ingredients.iter().map(|s| s.to_string()).collect()),
        );
        self
    }

    /// Search reports `total_results` hits but lists none of them
    pub fn with_unlisted_results(mut self, name: &str, total_results: u64) -> Self {
        self.counted_but_unlisted.insert(name.to_string(), total_results);
        self
    }

    pub fn with_broken_page(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), None);
        self
    }

    pub fn total_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
            + self.instruction_calls.load(Ordering::SeqCst)
            + self.extract_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecipeLookup for StubLookup {
    async fn search_by_name(&self, name: &str) -> Result<RecipeSearch, ServiceError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(total_results) = self.counted_but_unlisted.get(name) {
            return Ok(RecipeSearch {
                total_results: *total_results,
                results: Vec::new(),
            });
        }
        Ok(match self.recipes.get(name) {
            Some((id, _)) => RecipeSearch {
                total_results: 1,
                results: vec![RecipeSummary {
                    id: *id,
                    title: Some(name.to_string()),
                }],
            },
            None => RecipeSearch::default(),
        })
    }

    async fn instructions_by_id(&self, id: i64) -> Result<Vec<InstructionStep>, ServiceError> {
        self.instruction_calls.fetch_add(1, Ordering::SeqCst);
        let (_, steps) = self
            .recipes
            .values()
            .find(|(recipe_id, _)| *recipe_id == id)
            .ok_or_else(|| ServiceError::Api(404, format!("no recipe {}", id)))?;

        Ok(steps
            .iter()
            .enumerate()
            .map(|(i, names)| InstructionStep {
                number: Some(i as u32 + 1),
                ingredients: names
                    .iter()
                    .map(|n| NamedIngredient { name: n.clone() })
                    .collect(),
            })
            .collect())
    }

    async fn extract_from_url(&self, url: &str) -> Result<ExtractedRecipe, ServiceError> {
        self.extract_calls.fetch_add(1, Ordering::SeqCst);
        match self.pages.get(url) {
            Some(Some(names)) => Ok(ExtractedRecipe {
                extended_ingredients: named(&names.iter().map(String::as_str).collect::<Vec<_>>()),
            }),
            Some(None) => Err(ServiceError::Api(500, "extraction failed".to_string())),
            None => Err(ServiceError::Api(404, format!("unknown page {}", url))),
        }
    }
}

// ============================================================================
// Web search
// ============================================================================

#[derive(Default)]
pub struct StubSearch {
    /// query → ranked urls
    results: HashMap<String, Vec<String>>,
    pub calls: AtomicUsize,
}

impl StubSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(mut self, query: &str, urls: &[&str]) -> Self {
        self.results
            .insert(query.to_string(), urls.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebSearch for StubSearch {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<WebResult>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .results
            .get(query)
            .map(|urls| {
                urls.iter()
                    .take(max_results as usize)
                    .map(|url| WebResult {
                        url: url.clone(),
                        title: None,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Collaborators for two recipes: one found directly, one only via the web
pub struct KaleAndWings {
    pub trends: Arc<StubTrends>,
    pub lookup: Arc<StubLookup>,
    pub search: Arc<StubSearch>,
}

impl KaleAndWings {
    pub fn new() -> Self {
        Self {
            trends: Arc::new(StubTrends::new(&[("kale smoothie", 250), ("air fryer wings", 180)])),
            lookup: Arc::new(
                StubLookup::new()
                    .with_recipe("kale smoothie", 101, &[&["kale", "banana"], &["almond milk"]])
                    .with_page(
                        "https://example.com/wings",
                        &["chicken wings", "hot sauce", "butter"],
                    ),
            ),
            search: Arc::new(
                StubSearch::new().with_results("air fryer wings recipe", &["https://example.com/wings"]),
            ),
        }
    }

    pub fn pipeline(&self, dir: &Path, layout: ArtifactLayout, catalog: Option<PathBuf>) -> Pipeline {
        build_pipeline(
            self.trends.clone(),
            self.lookup.clone(),
            self.search.clone(),
            dir,
            layout,
            catalog,
        )
    }

    pub fn total_calls(&self) -> usize {
        self.trends.calls() + self.lookup.total_calls() + self.search.calls()
    }
}

pub fn build_pipeline(
    trends: Arc<StubTrends>,
    lookup: Arc<StubLookup>,
    search: Arc<StubSearch>,
    dir: &Path,
    layout: ArtifactLayout,
    catalog_path: Option<PathBuf>,
) -> Pipeline {
    Pipeline::new(
        trends,
        lookup,
        search,
        Arc::new(RateGate::unlimited()),
        CheckpointStore::new(dir, layout),
        PipelineSettings {
            catalog_path,
            ..PipelineSettings::default()
        },
    )
}

/// Write the three-product catalog and return its path
pub fn write_catalog(dir: &Path) -> PathBuf {
    let path = dir.join("products.csv");
    std::fs::write(
        &path,
        "product_id,product_name,aisle_id,department_id\n\
         1,Kale,83,4\n\
         2,Almond Milk,91,16\n\
         3,Chicken Wings,35,12\n",
    )
    .unwrap();
    path
}
