//! Pipeline Orchestrator
//!
//! Runs the three stages in order, each one skipped when its checkpoint is
//! already on disk:
//!
//! # Stages
//! - **Trending**: discover rising recipes, or load `trending_recipes.json`
//! - **Resolution**: resolve every trending recipe to ingredient names,
//!   journaling each outcome as it lands; the stage artifact is written once
//!   at the end
//! - **Matching**: when a catalog is configured, map every ingredient to its
//!   best product and persist per-recipe product-id sets
//!
//! # Error Handling
//! - Per-recipe collaborator failures become `FAILED` outcomes; the run goes on
//! - Trend discovery failure, checkpoint I/O and catalog errors abort the run

use super::report::{RunReport, StageSource};
use super::storage::CheckpointStore;
use crate::error::{PipelineError, Result};
use crate::matching::ProductMatcher;
use crate::services::{load_catalog, RateGate, RecipeResolver};
use crate::types::{RecipeLookup, RecipeRecord, ResolvedRecipe, TrendSource, TrendingRecipe, WebSearch};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Pipeline settings
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Keyword whose rising related queries are the trending recipes
    pub seed_keyword: String,
    pub timeframe: String,
    pub region: String,
    /// Matches scoring below this are left out of a recipe's product set
    pub min_match_score: f64,
    /// Product catalog CSV; matching is skipped without one
    pub catalog_path: Option<PathBuf>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            seed_keyword: "recipe".to_string(),
            timeframe: "now 7-d".to_string(),
            region: "US".to_string(),
            min_match_score: 0.6,
            catalog_path: None,
        }
    }
}

/// Trending → resolution → matching orchestrator
pub struct Pipeline {
    trends: Arc<dyn TrendSource>,
    resolver: RecipeResolver,
    store: CheckpointStore,
    settings: PipelineSettings,
}

impl Pipeline {
    /// Create a pipeline; `gate` paces the resolver's collaborator calls
    pub fn new(
        trends: Arc<dyn TrendSource>,
        lookup: Arc<dyn RecipeLookup>,
        search: Arc<dyn WebSearch>,
        gate: Arc<RateGate>,
        store: CheckpointStore,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            trends,
            resolver: RecipeResolver::new(lookup, search, gate),
            store,
            settings,
        }
    }

    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    /// Run all stages
    pub async fn run(&self) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        info!(
            run_id = %run_id,
            data_dir = %self.store.dir().display(),
            layout = ?self.store.layout(),
            "Pipeline starting"
        );
        let mut report = RunReport::new(run_id);

        // Stage 1: trending recipes
        let trending = match self.store.load_trending()? {
            Some(trending) => {
                report.trending_source = StageSource::Loaded;
                trending
            }
            None => {
                let trending = self.discover_trending().await?;
                self.store.save_trending(&trending)?;
                trending
            }
        };
        info!(recipes = trending.len(), source = ?report.trending_source, "Trending stage done");

        // Stage 2: ingredient resolution
        let recipes = match self.store.load_ingredients(&trending)? {
            Some(records) => {
                // A journal left by a run that died after writing the artifact
                self.store.clear_journal()?;
                report.resolution_source = StageSource::Loaded;
                records
            }
            None => self.resolve_all(&trending, &mut report).await?,
        };
        info!(
            recipes = recipes.len(),
            source = ?report.resolution_source,
            "Resolution stage done"
        );

        // Stage 3: catalog matching
        if let Some(catalog_path) = &self.settings.catalog_path {
            let catalog = load_catalog(catalog_path)?;
            let matcher = ProductMatcher::new(&catalog);
            let products = matcher.match_recipes(&recipes, self.settings.min_match_score);
            self.store.save_products(&products)?;
            report.products = Some(products);
        } else {
            debug!("No catalog configured, skipping matching stage");
        }

        report.recipes = recipes;
        report.log_summary();
        Ok(report)
    }

    async fn discover_trending(&self) -> Result<Vec<TrendingRecipe>> {
        let trending = self
            .trends
            .rising_queries(
                &self.settings.seed_keyword,
                &self.settings.timeframe,
                &self.settings.region,
            )
            .await
            .map_err(PipelineError::TrendDiscovery)?;

        info!(
            seed = %self.settings.seed_keyword,
            recipes = trending.len(),
            "Discovered trending recipes"
        );
        Ok(trending)
    }

    /// Resolve every trending recipe, resuming from the journal
    async fn resolve_all(
        &self,
        trending: &[TrendingRecipe],
        report: &mut RunReport,
    ) -> Result<Vec<RecipeRecord>> {
        let mut journal = self.store.load_journal()?;
        let mut resolved: HashMap<String, ResolvedRecipe> = HashMap::new();
        let mut records = Vec::with_capacity(trending.len());

        for (index, recipe) in trending.iter().enumerate() {
            if let Some(previous) = resolved.get(&recipe.name) {
                debug!(recipe = %recipe.name, "Duplicate trending name, reusing result");
                records.push(RecipeRecord {
                    name: recipe.name.clone(),
                    growth: recipe.growth_pct,
                    ingredients: previous.ingredients.clone(),
                });
                continue;
            }

            let outcome = match journal.remove(&recipe.name) {
                Some(entry) => {
                    debug!(recipe = %recipe.name, status = ?entry.status, "Resumed from journal");
                    report.record_outcome(&entry, true);
                    entry
                }
                None => {
                    info!(
                        recipe = %recipe.name,
                        progress = %format!("{}/{}", index + 1, trending.len()),
                        "Resolving recipe"
                    );
                    let entry = self.resolver.resolve(recipe).await;
                    self.store.append_journal(&entry)?;
                    report.record_outcome(&entry, false);
                    entry
                }
            };

            records.push(outcome.record());
            resolved.insert(recipe.name.clone(), outcome);
        }

        self.store.save_ingredients(&records)?;
        self.store.clear_journal()?;
        Ok(records)
    }
}
