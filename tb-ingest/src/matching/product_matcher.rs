//! Free-text ingredient → catalog product matching

use super::similarity::{similarity_prepared, PreparedText};
use crate::types::{Catalog, IngredientMatch, RecipeProducts, RecipeRecord};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Scores ingredients against every product name of a catalog
///
/// The scan runs in catalog order. The first product is the initial best and
/// a later product replaces it only with a strictly greater score, so ties go
/// to the earlier product and a scan where everything scores zero still
/// returns the first product. Only an empty catalog yields no product.
pub struct ProductMatcher {
    products: Vec<(i64, PreparedText)>,
}

impl ProductMatcher {
    pub fn new(catalog: &Catalog) -> Self {
        let products = catalog
            .products()
            .iter()
            .map(|p| (p.product_id, PreparedText::new(&p.product_name)))
            .collect();
        Self { products }
    }

    pub fn catalog_len(&self) -> usize {
        self.products.len()
    }

    /// Best product for one ingredient string
    pub fn best_match(&self, ingredient: &str) -> IngredientMatch {
        let mut best: Option<(i64, f64)> = None;

        for (product_id, name) in &self.products {
            let score = similarity_prepared(ingredient, name);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((*product_id, score)),
            }
        }

        IngredientMatch {
            ingredient_text: ingredient.to_string(),
            product_id: best.map(|(id, _)| id),
            score: best.map(|(_, score)| score).unwrap_or(0.0),
        }
    }

    /// Product id sets for each recipe
    ///
    /// Matches scoring below `min_score` stay out of the set. Each distinct
    /// ingredient string is scanned once per call.
    pub fn match_recipes(&self, recipes: &[RecipeRecord], min_score: f64) -> Vec<RecipeProducts> {
        let mut memo: HashMap<&str, IngredientMatch> = HashMap::new();

        recipes
            .iter()
            .map(|recipe| {
                let mut product_ids = BTreeSet::new();
                for ingredient in &recipe.ingredients {
                    let found = memo
                        .entry(ingredient.as_str())
                        .or_insert_with(|| self.best_match(ingredient));

                    match found.product_id {
                        Some(id) if found.score >= min_score => {
                            product_ids.insert(id);
                        }
                        Some(id) => {
                            debug!(
                                recipe = %recipe.name,
                                ingredient = %ingredient,
                                product_id = id,
                                score = found.score,
                                "Match below threshold, skipped"
                            );
                        }
                        None => {}
                    }
                }

                RecipeProducts {
                    name: recipe.name.clone(),
                    growth: recipe.growth,
                    product_ids,
                }
            })
            .collect()
    }
}

/// Best product id for `ingredient`, absent only for an empty catalog
pub fn match_product(ingredient: &str, catalog: &Catalog) -> Option<i64> {
    ProductMatcher::new(catalog).best_match(ingredient).product_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CatalogProduct;

    fn catalog(entries: &[(i64, &str)]) -> Catalog {
        Catalog::new(
            entries
                .iter()
                .map(|(id, name)| CatalogProduct {
                    product_id: *id,
                    product_name: name.to_string(),
                })
                .collect(),
        )
        .unwrap()
    }

    fn record(name: &str, ingredients: &[&str]) -> RecipeRecord {
        RecipeRecord {
            name: name.to_string(),
            growth: 100,
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_empty_catalog_returns_absent() {
        let empty = catalog(&[]);
        assert_eq!(match_product("kale", &empty), None);
        assert_eq!(match_product("", &empty), None);

        let result = ProductMatcher::new(&empty).best_match("kale");
        assert_eq!(result.product_id, None);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_empty_ingredient_returns_first_entry() {
        let products = catalog(&[(7, "Kale"), (8, "Almond Milk")]);
        let result = ProductMatcher::new(&products).best_match("");
        assert_eq!(result.product_id, Some(7));
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_all_zero_scores_return_first_entry() {
        let products = catalog(&[(3, "abc"), (4, "def")]);
        assert_eq!(match_product("xyz", &products), Some(3));
    }

    #[test]
    fn test_equal_nonzero_scores_first_seen_wins() {
        let products = catalog(&[(10, "milk a"), (11, "milk b")]);
        let result = ProductMatcher::new(&products).best_match("milk");
        assert_eq!(result.product_id, Some(10));
        assert!((result.score - 0.8).abs() < 1e-9);

        let reversed = catalog(&[(11, "milk b"), (10, "milk a")]);
        assert_eq!(match_product("milk", &reversed), Some(11));
    }

    #[test]
    fn test_strictly_better_later_entry_wins() {
        let products = catalog(&[(1, "Kale"), (2, "Almond Milk"), (3, "Chicken Wings")]);
        assert_eq!(match_product("chicken wings", &products), Some(3));
        assert_eq!(match_product("ALMOND MILK", &products), Some(2));
    }

    #[test]
    fn test_duplicate_names_resolve_to_earlier_id() {
        let products = catalog(&[(5, "Butter"), (6, "Butter")]);
        assert_eq!(match_product("butter", &products), Some(5));
    }

    #[test]
    fn test_match_recipes_applies_threshold_and_dedupes() {
        let products = catalog(&[(1, "Kale"), (2, "Almond Milk"), (3, "Chicken Wings")]);
        let matcher = ProductMatcher::new(&products);

        let recipes = vec![
            record("kale smoothie", &["kale", "banana", "almond milk", "kale"]),
            record("air fryer wings", &["chicken wings", "hot sauce", "butter"]),
        ];

        let grouped = matcher.match_recipes(&recipes, 0.6);
        assert_eq!(grouped[0].product_ids, BTreeSet::from([1, 2]));
        assert_eq!(grouped[1].product_ids, BTreeSet::from([3]));

        // No floor: every ingredient contributes its best product
        let unfiltered = matcher.match_recipes(&recipes, 0.0);
        assert_eq!(unfiltered[1].product_ids, BTreeSet::from([1, 3]));
    }

    #[test]
    fn test_match_recipes_empty_catalog_gives_empty_sets() {
        let matcher = ProductMatcher::new(&catalog(&[]));
        let grouped = matcher.match_recipes(&[record("toast", &["bread"])], 0.0);
        assert!(grouped[0].product_ids.is_empty());
        assert_eq!(grouped[0].name, "toast");
    }
}
