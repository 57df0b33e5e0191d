//! Run summary
//!
//! Collected by the pipeline while it runs and printed by the binary when it
//! finishes. Unlike the stage artifacts, the report tells empty results
//! apart from failed ones.

use crate::types::{RecipeProducts, RecipeRecord, ResolutionStatus, ResolvedRecipe};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

/// Where a stage's output came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageSource {
    /// Read back from an existing checkpoint
    Loaded,
    /// Produced by this run
    Computed,
}

/// **Resolution statistics**
///
/// Display: "N direct, N fallback, N empty, N failed (N resumed)"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionStats {
    pub direct: usize,
    pub fallback: usize,
    pub empty: usize,
    pub failed: usize,
    /// Outcomes replayed from the journal rather than resolved again
    pub resumed: usize,
}

impl ResolutionStats {
    pub fn record(&mut self, status: ResolutionStatus) {
        match status {
            ResolutionStatus::ResolvedDirect => self.direct += 1,
            ResolutionStatus::ResolvedFallback => self.fallback += 1,
            ResolutionStatus::Empty => self.empty += 1,
            ResolutionStatus::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.direct + self.fallback + self.empty + self.failed
    }

    pub fn display_string(&self) -> String {
        format!(
            "{} direct, {} fallback, {} empty, {} failed ({} resumed)",
            self.direct, self.fallback, self.empty, self.failed, self.resumed
        )
    }
}

/// Summary of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub trending_source: StageSource,
    pub resolution_source: StageSource,
    /// Recipes with their resolved ingredients, in trending order
    pub recipes: Vec<RecipeRecord>,
    /// Empty when the resolution checkpoint was loaded
    pub stats: ResolutionStats,
    /// `(recipe, cause)` for every failed resolution
    pub failures: Vec<(String, String)>,
    /// Absent when no catalog is configured
    pub products: Option<Vec<RecipeProducts>>,
}

impl RunReport {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            trending_source: StageSource::Computed,
            resolution_source: StageSource::Computed,
            recipes: Vec::new(),
            stats: ResolutionStats::default(),
            failures: Vec::new(),
            products: None,
        }
    }

    /// Count one resolution outcome
    pub fn record_outcome(&mut self, resolved: &ResolvedRecipe, resumed: bool) {
        self.stats.record(resolved.status);
        if resumed {
            self.stats.resumed += 1;
        }
        if resolved.status == ResolutionStatus::Failed {
            let cause = resolved.failure.clone().unwrap_or_default();
            self.failures.push((resolved.name.clone(), cause));
        }
    }

    pub fn log_summary(&self) {
        info!(
            run_id = %self.run_id,
            trending = ?self.trending_source,
            resolution = ?self.resolution_source,
            recipes = self.recipes.len(),
            "Run complete"
        );
        if self.resolution_source == StageSource::Computed {
            info!("Resolution: {}", self.stats.display_string());
        }
        for (name, cause) in &self.failures {
            warn!(recipe = %name, cause = %cause, "Recipe could not be resolved");
        }
        if let Some(products) = &self.products {
            let matched: usize = products.iter().map(|p| p.product_ids.len()).sum();
            info!(recipes = products.len(), products = matched, "Matching complete");
        }
    }
}
