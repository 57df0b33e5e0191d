//! Service modules: external collaborators, rate gate, resolution, catalog

mod http;

pub mod brave_client;
pub mod catalog_loader;
pub mod rate_gate;
pub mod recipe_resolver;
pub mod spoonacular_client;
pub mod trends_client;

pub use brave_client::BraveSearchClient;
pub use catalog_loader::{load_catalog, CatalogError};
pub use rate_gate::RateGate;
pub use recipe_resolver::{flatten_step_ingredients, RecipeResolver, ResolutionState, WEB_SEARCH_RESULTS};
pub use spoonacular_client::SpoonacularClient;
pub use trends_client::TrendsClient;
