//! Per-recipe ingredient resolution
//!
//! # State Progression
//! STRUCTURED_LOOKUP → EXTRACT_DIRECT → DONE(ingredients)
//! STRUCTURED_LOOKUP → WEB_SEARCH → EXTRACT_FROM_URL → DONE(ingredients)
//! STRUCTURED_LOOKUP → WEB_SEARCH → DONE(empty)
//!
//! Any failing step ends resolution with status `FAILED` and no ingredients.
//! Failures are not retried; the caller moves on to the next recipe.

use super::rate_gate::RateGate;
use crate::types::{
    InstructionStep, RecipeLookup, ResolutionStatus, ResolvedRecipe, ServiceError,
    TrendingRecipe, WebSearch,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Number of ranked results requested from web search
pub const WEB_SEARCH_RESULTS: u32 = 10;

/// Resolution state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionState {
    StructuredLookup,
    ExtractDirect { recipe_id: i64 },
    WebSearch,
    ExtractFromUrl { url: String },
    Done {
        status: ResolutionStatus,
        ingredients: Vec<String>,
    },
}

impl ResolutionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::StructuredLookup => "STRUCTURED_LOOKUP",
            Self::ExtractDirect { .. } => "EXTRACT_DIRECT",
            Self::WebSearch => "WEB_SEARCH",
            Self::ExtractFromUrl { .. } => "EXTRACT_FROM_URL",
            Self::Done { .. } => "DONE",
        }
    }
}

/// Walks the lookup → web search fallback chain for one recipe at a time
///
/// Every collaborator call first passes the shared [`RateGate`].
pub struct RecipeResolver {
    lookup: Arc<dyn RecipeLookup>,
    search: Arc<dyn WebSearch>,
    gate: Arc<RateGate>,
}

impl RecipeResolver {
    pub fn new(lookup: Arc<dyn RecipeLookup>, search: Arc<dyn WebSearch>, gate: Arc<RateGate>) -> Self {
        Self {
            lookup,
            search,
            gate,
        }
    }

    /// Resolve one recipe; never fails, errors become `FAILED` outcomes
    pub async fn resolve(&self, recipe: &TrendingRecipe) -> ResolvedRecipe {
        let mut state = ResolutionState::StructuredLookup;

        loop {
            if let ResolutionState::Done { status, ingredients } = state {
                info!(
                    recipe = %recipe.name,
                    status = ?status,
                    ingredients = ingredients.len(),
                    "Recipe resolved"
                );
                return ResolvedRecipe::new(recipe, status, ingredients);
            }

            let step = state.name();
            match self.advance(&recipe.name, state).await {
                Ok(next) => {
                    debug!(recipe = %recipe.name, from = step, to = next.name(), "Resolution step");
                    state = next;
                }
                Err(e) => {
                    warn!(
                        recipe = %recipe.name,
                        step,
                        error = %e,
                        "Error retrieving ingredients"
                    );
                    return ResolvedRecipe::failed(recipe, format!("{}: {}", step, e));
                }
            }
        }
    }

    async fn advance(
        &self,
        name: &str,
        state: ResolutionState,
    ) -> Result<ResolutionState, ServiceError> {
        match state {
            ResolutionState::StructuredLookup => {
                self.gate.admit().await;
                let search = self.lookup.search_by_name(name).await?;

                if search.total_results == 0 {
                    return Ok(ResolutionState::WebSearch);
                }

                let first = search.results.first().ok_or_else(|| {
                    ServiceError::Malformed(format!(
                        "totalResults is {} but no results were listed",
                        search.total_results
                    ))
                })?;
                Ok(ResolutionState::ExtractDirect { recipe_id: first.id })
            }

            ResolutionState::ExtractDirect { recipe_id } => {
                self.gate.admit().await;
                let steps = self.lookup.instructions_by_id(recipe_id).await?;
                Ok(ResolutionState::Done {
                    status: ResolutionStatus::ResolvedDirect,
                    ingredients: flatten_step_ingredients(&steps),
                })
            }

            ResolutionState::WebSearch => {
                self.gate.admit().await;
                let query = format!("{} recipe", name);
                let results = self.search.search(&query, WEB_SEARCH_RESULTS).await?;

                // Only the top hit is tried
                Ok(match results.into_iter().next() {
                    Some(top) => ResolutionState::ExtractFromUrl { url: top.url },
                    None => ResolutionState::Done {
                        status: ResolutionStatus::Empty,
                        ingredients: Vec::new(),
                    },
                })
            }

            ResolutionState::ExtractFromUrl { url } => {
                self.gate.admit().await;
                let extracted = self.lookup.extract_from_url(&url).await?;
                Ok(ResolutionState::Done {
                    status: ResolutionStatus::ResolvedFallback,
                    ingredients: extracted
                        .extended_ingredients
                        .into_iter()
                        .map(|i| i.name)
                        .collect(),
                })
            }

            done @ ResolutionState::Done { .. } => Ok(done),
        }
    }
}

/// Ingredient names in step order, then in order within each step
pub fn flatten_step_ingredients(steps: &[InstructionStep]) -> Vec<String> {
    steps
        .iter()
        .flat_map(|step| step.ingredients.iter().map(|i| i.name.clone()))
        .collect()
}
