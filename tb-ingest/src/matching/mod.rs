//! Ingredient → catalog product matching

pub mod product_matcher;
pub mod similarity;

pub use product_matcher::{match_product, ProductMatcher};
pub use similarity::{similarity, similarity_prepared, PreparedText};
