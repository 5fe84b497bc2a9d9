use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

use crate::{
    error::EngineError,
    models::{normalize_ingredients, Recipe, RecommendationQuery, ScoredRecipe},
    services::{
        dietary::{self, DietaryRestriction},
        lexical::{self, LexicalIndex, QueryVector},
        substitutions,
    },
};

/// Missing ingredients that receive substitution suggestions
const MAX_SUGGESTED_INGREDIENTS: usize = 3;
/// Substitutes kept per missing ingredient
const MAX_SUBSTITUTES: usize = 2;

/// How the per-recipe score is assembled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum ScoringPolicy {
    /// `0.6 * ingredient match + 0.4 * coverage`; recipes sharing no
    /// ingredient with the query are dropped
    #[default]
    #[serde(rename = "gated", alias = "direct_match_gated")]
    DirectMatchGated,
    /// `0.4 * lexical + 0.4 * ingredient match + 0.2 * coverage`; every
    /// filter-surviving recipe is ranked
    #[serde(rename = "blended", alias = "ml_blended")]
    MlBlended,
}

/// Recipe recommendation engine
///
/// Holds the corpus and its fitted lexical index. Built once at startup and
/// shared read-only; `recommend` takes `&self` and never mutates anything.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    recipes: Vec<Recipe>,
    index: Option<LexicalIndex>,
    policy: ScoringPolicy,
}

/// Normalized query state shared across all candidates of one call
struct PreparedQuery {
    ingredients: HashSet<String>,
    restrictions: Vec<DietaryRestriction>,
    max_cooking_time: Option<u32>,
    difficulty: Option<String>,
    cuisine: Option<String>,
    lexical: Option<QueryVector>,
}

impl RecommendationEngine {
    /// Creates an engine over the corpus; an empty corpus is legal
    pub fn new(recipes: Vec<Recipe>, policy: ScoringPolicy) -> Self {
        let engine = Self {
            index: LexicalIndex::fit(&recipes),
            recipes,
            policy,
        };

        match engine.lexical_index() {
            Ok(index) => tracing::info!(
                recipes = engine.recipes.len(),
                vocabulary = index.vocabulary_size(),
                policy = ?policy,
                "Recommendation engine initialized"
            ),
            Err(e) => tracing::warn!(
                error = %e,
                policy = ?policy,
                "Lexical similarity disabled"
            ),
        }

        engine
    }

    /// The fitted lexical index; unavailable for an empty corpus
    pub fn lexical_index(&self) -> Result<&LexicalIndex, EngineError> {
        self.index
            .as_ref()
            .ok_or(EngineError::LexicalIndexUnavailable)
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn get(&self, id: u32) -> Option<&Recipe> {
        self.recipes.iter().find(|recipe| recipe.id == id)
    }

    /// Sorted set of every normalized ingredient name in the corpus
    pub fn all_ingredients(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .recipes
            .iter()
            .flat_map(Recipe::normalized_ingredients)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        names.sort();
        names
    }

    /// Ranks the corpus against a query
    ///
    /// An empty ingredient list yields no results. Recipes that fail to
    /// score are logged and skipped.
    pub fn recommend(&self, query: &RecommendationQuery) -> Vec<ScoredRecipe> {
        let Some(prepared) = self.prepare(query) else {
            tracing::debug!("Empty ingredient query, nothing to recommend");
            return Vec::new();
        };

        let mut results = Vec::new();
        for (position, recipe) in self.recipes.iter().enumerate() {
            if !prepared.admits(recipe) {
                continue;
            }

            match self.score(&prepared, position, recipe) {
                Ok(Some(scored)) => results.push(scored),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(recipe_id = recipe.id, error = %e, "Skipping recipe");
                }
            }
        }

        // Vec::sort_by is stable: equal scores keep corpus order
        results.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
        results.truncate(query.limit);

        tracing::debug!(
            query_ingredients = prepared.ingredients.len(),
            restrictions = prepared.restrictions.len(),
            returned = results.len(),
            "Scored recommendations"
        );

        results
    }

    fn prepare(&self, query: &RecommendationQuery) -> Option<PreparedQuery> {
        let ingredients: HashSet<String> = normalize_ingredients(&query.ingredients)
            .into_iter()
            .collect();
        if ingredients.is_empty() {
            return None;
        }

        let difficulty = non_blank(query.difficulty.as_deref());
        let cuisine = non_blank(query.cuisine_preference.as_deref());

        let lexical = match (self.policy, &self.index) {
            (ScoringPolicy::MlBlended, Some(index)) => Some(index.query_vector(
                &lexical::query_profile(
                    &query.ingredients,
                    cuisine.as_deref(),
                    difficulty.as_deref(),
                ),
            )),
            _ => None,
        };

        Some(PreparedQuery {
            ingredients,
            restrictions: dietary::parse_restrictions(&query.dietary_restrictions),
            max_cooking_time: query.max_cooking_time,
            difficulty,
            cuisine,
            lexical,
        })
    }

    fn score(
        &self,
        query: &PreparedQuery,
        position: usize,
        recipe: &Recipe,
    ) -> Result<Option<ScoredRecipe>, EngineError> {
        let recipe_ingredients = recipe.normalized_ingredients();
        if recipe_ingredients.is_empty() {
            return Ok(None);
        }
        if recipe.name.trim().is_empty() {
            return Err(EngineError::MalformedRecipe {
                id: recipe.id,
                reason: "recipe has no name".to_string(),
            });
        }

        let direct_matches = recipe_ingredients
            .iter()
            .filter(|ingredient| query.ingredients.contains(*ingredient))
            .count();

        let ingredient_match_score = direct_matches as f64 / recipe_ingredients.len() as f64;
        let coverage_score = direct_matches as f64 / query.ingredients.len() as f64;

        let final_score = match self.policy {
            ScoringPolicy::DirectMatchGated => {
                if direct_matches == 0 {
                    return Ok(None);
                }
                0.6 * ingredient_match_score + 0.4 * coverage_score
            }
            ScoringPolicy::MlBlended => {
                let lexical_score = self.lexical_score(query, position)?;
                0.4 * lexical_score + 0.4 * ingredient_match_score + 0.2 * coverage_score
            }
        };

        let missing_ingredients: Vec<String> = recipe_ingredients
            .into_iter()
            .filter(|ingredient| !query.ingredients.contains(ingredient))
            .collect();

        let substitution_suggestions: BTreeMap<String, Vec<String>> = missing_ingredients
            .iter()
            .take(MAX_SUGGESTED_INGREDIENTS)
            .filter_map(|ingredient| {
                let subs = substitutions::lookup(ingredient);
                (!subs.is_empty()).then(|| {
                    (
                        ingredient.clone(),
                        subs.iter()
                            .take(MAX_SUBSTITUTES)
                            .map(|s| s.to_string())
                            .collect(),
                    )
                })
            })
            .collect();

        Ok(Some(ScoredRecipe {
            recipe: recipe.clone(),
            match_score: round_percentage(final_score),
            ingredient_match_percentage: round_percentage(ingredient_match_score),
            missing_ingredients,
            substitution_suggestions,
        }))
    }

    fn lexical_score(&self, query: &PreparedQuery, position: usize) -> Result<f64, EngineError> {
        match (&self.index, &query.lexical) {
            (Some(index), Some(vector)) => index
                .similarity(vector, position)
                .ok_or(EngineError::LexicalVectorMissing(position)),
            _ => Ok(0.0),
        }
    }
}

impl PreparedQuery {
    /// Dietary restrictions plus the hard time, difficulty and cuisine filters
    fn admits(&self, recipe: &Recipe) -> bool {
        if !dietary::is_diet_compatible(recipe, &self.restrictions) {
            return false;
        }
        if let Some(max) = self.max_cooking_time {
            if recipe.cooking_time > max {
                return false;
            }
        }
        if let Some(difficulty) = &self.difficulty {
            if recipe.difficulty.trim().to_lowercase() != *difficulty {
                return false;
            }
        }
        if let Some(cuisine) = &self.cuisine {
            if recipe.cuisine.trim().to_lowercase() != *cuisine {
                return false;
            }
        }
        true
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

/// Scales a 0-1 ratio to a percentage with one decimal place, ties to even
fn round_percentage(ratio: f64) -> f64 {
    (ratio * 1000.0).round_ties_even() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DietaryFlags, DietaryInfo};

    fn scenario_corpus() -> Vec<Recipe> {
        vec![
            Recipe::new(1, "Garlic Chicken Rice", &["chicken", "rice", "garlic"])
                .with_cooking_time(20)
                .with_difficulty("easy")
                .with_cuisine("asian")
                .with_dietary_info(DietaryInfo::Tags(vec![])),
            Recipe::new(2, "Garlic Tofu Rice", &["tofu", "rice", "garlic"])
                .with_cooking_time(15)
                .with_difficulty("easy")
                .with_cuisine("asian")
                .with_dietary_info(DietaryInfo::Flags(DietaryFlags {
                    vegetarian: Some(true),
                    vegan: Some(true),
                    ..Default::default()
                })),
        ]
    }

    fn larger_corpus() -> Vec<Recipe> {
        vec![
            Recipe::new(1, "Pancakes", &["flour", "milk", "eggs", "butter", "sugar"])
                .with_cooking_time(20)
                .with_difficulty("easy")
                .with_cuisine("american"),
            Recipe::new(2, "Omelette", &["eggs", "butter", "cheese"])
                .with_cooking_time(10)
                .with_difficulty("easy")
                .with_cuisine("french"),
            Recipe::new(3, "Tomato Pasta", &["pasta", "tomato", "garlic", "olive oil"])
                .with_cooking_time(25)
                .with_difficulty("easy")
                .with_cuisine("italian"),
            Recipe::new(4, "Beef Stew", &["beef", "potatoes", "carrot", "onion"])
                .with_cooking_time(120)
                .with_difficulty("hard")
                .with_cuisine("irish"),
            Recipe::new(5, "Scrambled Eggs", &["eggs", "butter"])
                .with_cooking_time(5)
                .with_difficulty("easy")
                .with_cuisine("american"),
        ]
    }

    fn gated(recipes: Vec<Recipe>) -> RecommendationEngine {
        RecommendationEngine::new(recipes, ScoringPolicy::DirectMatchGated)
    }

    #[test]
    fn test_empty_ingredients_returns_nothing() {
        let engine = gated(larger_corpus());
        assert!(engine.recommend(&RecommendationQuery::new::<&str>(&[])).is_empty());
        assert!(engine.recommend(&RecommendationQuery::new(&["  ", ""])).is_empty());

        let blended = RecommendationEngine::new(larger_corpus(), ScoringPolicy::MlBlended);
        assert!(blended.recommend(&RecommendationQuery::default()).is_empty());
    }

    #[test]
    fn test_vegetarian_scenario() {
        let engine = gated(scenario_corpus());
        let query = RecommendationQuery::new(&["rice", "garlic"]).with_restrictions(&["vegetarian"]);

        let results = engine.recommend(&query);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].recipe.id, 2);
        assert_eq!(results[0].ingredient_match_percentage, 66.7);
        assert_eq!(results[0].missing_ingredients, vec!["tofu"]);
        assert_eq!(
            results[0].substitution_suggestions.get("tofu"),
            None,
            "tofu has no table entry"
        );
    }

    #[test]
    fn test_no_direct_matches_gated_returns_nothing() {
        let engine = gated(scenario_corpus());
        let results = engine.recommend(&RecommendationQuery::new(&["nonexistent_ingredient"]));
        assert!(results.is_empty());
    }

    #[test]
    fn test_max_cooking_time_excludes_both() {
        let engine = gated(scenario_corpus());
        let query = RecommendationQuery::new(&["rice", "garlic"]).with_max_cooking_time(10);
        assert!(engine.recommend(&query).is_empty());
    }

    #[test]
    fn test_gated_score_formula() {
        let engine = gated(scenario_corpus());
        let results = engine.recommend(&RecommendationQuery::new(&["Rice", " GARLIC "]));

        // 0.6 * 2/3 + 0.4 * 2/2 = 0.8
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.match_score == 80.0));
        // ties keep corpus order
        assert_eq!(results[0].recipe.id, 1);
        assert_eq!(results[1].recipe.id, 2);
    }

    #[test]
    fn test_exact_ingredient_set_scores_full_match() {
        let engine = gated(larger_corpus());
        let results = engine.recommend(&RecommendationQuery::new(&["butter", "eggs"]));

        let scrambled = results.iter().find(|r| r.recipe.id == 5).unwrap();
        assert_eq!(scrambled.ingredient_match_percentage, 100.0);
        assert_eq!(scrambled.match_score, 100.0);
        assert!(scrambled.missing_ingredients.is_empty());
        assert_eq!(results[0].recipe.id, 5);
    }

    #[test]
    fn test_scores_bounded_and_non_increasing() {
        for policy in [ScoringPolicy::DirectMatchGated, ScoringPolicy::MlBlended] {
            let engine = RecommendationEngine::new(larger_corpus(), policy);
            let query = RecommendationQuery::new(&["eggs", "butter", "garlic", "flour"]);
            let results = engine.recommend(&query);

            assert!(!results.is_empty());
            assert!(results
                .iter()
                .all(|r| (0.0..=100.0).contains(&r.match_score)));
            assert!(results
                .windows(2)
                .all(|pair| pair[0].match_score >= pair[1].match_score));
        }
    }

    #[test]
    fn test_missing_never_overlaps_query() {
        let engine = RecommendationEngine::new(larger_corpus(), ScoringPolicy::MlBlended);
        let query = RecommendationQuery::new(&["Eggs", "butter", "tomato"]);
        let normalized: HashSet<String> = normalize_ingredients(&query.ingredients)
            .into_iter()
            .collect();

        for result in engine.recommend(&query) {
            assert!(result
                .missing_ingredients
                .iter()
                .all(|m| !normalized.contains(m)));
        }
    }

    #[test]
    fn test_substitutions_limited() {
        let engine = gated(larger_corpus());
        let results = engine.recommend(&RecommendationQuery::new(&["sugar"]));
        let pancakes = &results[0];

        assert_eq!(pancakes.recipe.id, 1);
        assert_eq!(
            pancakes.missing_ingredients,
            vec!["flour", "milk", "eggs", "butter"]
        );
        // only the first three missing ingredients, two substitutes each
        assert_eq!(pancakes.substitution_suggestions.len(), 3);
        assert!(!pancakes.substitution_suggestions.contains_key("butter"));
        assert_eq!(
            pancakes.substitution_suggestions["flour"],
            vec!["almond flour", "coconut flour"]
        );
        assert!(pancakes
            .substitution_suggestions
            .values()
            .all(|subs| subs.len() <= MAX_SUBSTITUTES));
    }

    #[test]
    fn test_hard_filters_case_insensitive() {
        let engine = gated(larger_corpus());

        let query = RecommendationQuery::new(&["eggs"]).with_cuisine("AMERICAN");
        let ids: Vec<u32> = engine.recommend(&query).iter().map(|r| r.recipe.id).collect();
        assert_eq!(ids, vec![5, 1]);

        let query = RecommendationQuery::new(&["beef", "eggs"]).with_difficulty("Hard");
        let ids: Vec<u32> = engine.recommend(&query).iter().map(|r| r.recipe.id).collect();
        assert_eq!(ids, vec![4]);
    }

    #[test]
    fn test_blank_filters_are_ignored() {
        let engine = gated(larger_corpus());
        let query = RecommendationQuery::new(&["eggs"])
            .with_cuisine("")
            .with_difficulty("  ");
        assert_eq!(engine.recommend(&query).len(), 3);
    }

    #[test]
    fn test_limit_truncates() {
        let engine = gated(larger_corpus());
        let query = RecommendationQuery::new(&["eggs", "butter"]).with_limit(2);
        assert_eq!(engine.recommend(&query).len(), 2);
    }

    #[test]
    fn test_blended_includes_zero_overlap_candidates() {
        let engine = RecommendationEngine::new(larger_corpus(), ScoringPolicy::MlBlended);
        let query = RecommendationQuery::new(&["eggs"]);
        let results = engine.recommend(&query);

        assert_eq!(results.len(), larger_corpus().len());
        let stew = results.iter().find(|r| r.recipe.id == 4).unwrap();
        assert_eq!(stew.match_score, 0.0);
        assert_eq!(results.last().unwrap().match_score, 0.0);
    }

    #[test]
    fn test_blended_uses_lexical_similarity() {
        let engine = RecommendationEngine::new(scenario_corpus(), ScoringPolicy::MlBlended);
        let results = engine.recommend(&RecommendationQuery::new(&["tofu"]).with_cuisine("asian"));

        assert_eq!(results[0].recipe.id, 2);
        // lexical similarity lifts the score above the pure overlap part (0.4/3 + 0.2)
        assert!(results[0].match_score > 33.4);
        assert_eq!(results[1].recipe.id, 1);
        assert!(results[1].match_score > 0.0);
    }

    #[test]
    fn test_recipes_without_ingredients_are_skipped() {
        let mut recipes = larger_corpus();
        recipes.push(Recipe::new(6, "Air", &[]));
        let engine = RecommendationEngine::new(recipes, ScoringPolicy::MlBlended);

        let results = engine.recommend(&RecommendationQuery::new(&["eggs"]));
        assert!(results.iter().all(|r| r.recipe.id != 6));
    }

    #[test]
    fn test_malformed_recipe_does_not_abort_batch() {
        let mut recipes = larger_corpus();
        recipes.insert(0, Recipe::new(9, "  ", &["eggs"]));
        let engine = gated(recipes);

        let results = engine.recommend(&RecommendationQuery::new(&["eggs", "butter"]));
        assert!(results.iter().all(|r| r.recipe.id != 9));
        assert_eq!(results[0].recipe.id, 5);
    }

    #[test]
    fn test_empty_corpus() {
        for policy in [ScoringPolicy::DirectMatchGated, ScoringPolicy::MlBlended] {
            let engine = RecommendationEngine::new(vec![], policy);
            assert!(engine
                .recommend(&RecommendationQuery::new(&["eggs"]))
                .is_empty());
            assert!(engine.all_ingredients().is_empty());
            assert_eq!(
                engine.lexical_index().err(),
                Some(EngineError::LexicalIndexUnavailable)
            );
        }
        assert!(gated(scenario_corpus()).lexical_index().is_ok());
    }

    #[test]
    fn test_percentages_round_half_to_even() {
        assert_eq!(round_percentage(1.0 / 16.0), 6.2);
        assert_eq!(round_percentage(3.0 / 16.0), 18.8);
        assert_eq!(round_percentage(0.75), 75.0);

        let ingredients: Vec<String> = (0..16).map(|i| format!("item {}", i)).collect();
        let names: Vec<&str> = ingredients.iter().map(String::as_str).collect();
        let engine = gated(vec![Recipe::new(1, "Long List", &names)]);

        let results = engine.recommend(&RecommendationQuery::new(&["item 0"]));
        assert_eq!(results[0].ingredient_match_percentage, 6.2);
    }

    #[test]
    fn test_all_ingredients_sorted_unique() {
        let engine = gated(scenario_corpus());
        assert_eq!(
            engine.all_ingredients(),
            vec!["chicken", "garlic", "rice", "tofu"]
        );
    }

    #[test]
    fn test_recommend_is_repeatable() {
        let engine = RecommendationEngine::new(larger_corpus(), ScoringPolicy::MlBlended);
        let query = RecommendationQuery::new(&["eggs", "butter", "flour"]);
        let first: Vec<(u32, f64)> = engine
            .recommend(&query)
            .iter()
            .map(|r| (r.recipe.id, r.match_score))
            .collect();
        let second: Vec<(u32, f64)> = engine
            .recommend(&query)
            .iter()
            .map(|r| (r.recipe.id, r.match_score))
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RecommendationEngine>();
    }

    #[test]
    fn test_scoring_policy_deserialize() {
        let policy: ScoringPolicy = serde_json::from_str("\"blended\"").unwrap();
        assert_eq!(policy, ScoringPolicy::MlBlended);
        let policy: ScoringPolicy = serde_json::from_str("\"direct_match_gated\"").unwrap();
        assert_eq!(policy, ScoringPolicy::DirectMatchGated);
    }
}
