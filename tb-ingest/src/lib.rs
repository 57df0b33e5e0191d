//! tb-ingest library
//!
//! Turns trending recipe searches into sets of catalog products:
//! trend discovery → per-recipe ingredient resolution (structured lookup with
//! a web search fallback) → fuzzy matching of ingredients to products.
//! Each stage checkpoints to JSON so interrupted runs pick up where they
//! stopped.

pub mod error;
pub mod matching;
pub mod services;
pub mod types;
pub mod workflow;

pub use error::{PipelineError, Result};
pub use types::{
    Catalog, CatalogProduct, RecipeLookup, RecipeProducts, RecipeRecord, ResolutionStatus,
    ResolvedRecipe, ServiceError, TrendSource, TrendingRecipe, WebSearch,
};
pub use workflow::{CheckpointStore, Pipeline, PipelineSettings, RunReport};
