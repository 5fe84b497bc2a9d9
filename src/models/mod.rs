use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

pub mod detection;
pub mod feedback;

pub use detection::DetectedIngredient;
pub use feedback::{InvalidRating, Rating, RatingEntry, UserFeedback};

pub const DEFAULT_LIMIT: usize = 10;

/// A recipe from the static corpus
///
/// Fields the engine does not interpret (instructions, servings, nutrition, ...)
/// are kept in `extra` and echoed back untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub cuisine: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub cooking_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary_info: Option<DietaryInfo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Recipe {
    /// Creates a recipe with no dietary metadata
    pub fn new(id: u32, name: impl Into<String>, ingredients: &[&str]) -> Self {
        Self {
            id,
            name: name.into(),
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
            cuisine: String::new(),
            difficulty: String::new(),
            cooking_time: 0,
            dietary_info: None,
            extra: Map::new(),
        }
    }

    pub fn with_cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine = cuisine.into();
        self
    }

    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = difficulty.into();
        self
    }

    pub fn with_cooking_time(mut self, minutes: u32) -> Self {
        self.cooking_time = minutes;
        self
    }

    pub fn with_dietary_info(mut self, info: DietaryInfo) -> Self {
        self.dietary_info = Some(info);
        self
    }

    /// Lower-cased, trimmed ingredient names in recipe order, without duplicates or blanks
    pub fn normalized_ingredients(&self) -> Vec<String> {
        normalize_ingredients(&self.ingredients)
    }
}

/// Normalizes raw ingredient strings, keeping first-occurrence order
pub fn normalize_ingredients<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

/// Dietary metadata in either of the two shapes found in recipe corpora
///
/// The shape is detected from the JSON itself: an array is a tag list,
/// an object is a set of boolean flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DietaryInfo {
    /// Free-text tags such as `contains_dairy` or `contains_gluten`
    Tags(Vec<String>),
    /// Explicit per-restriction flags
    Flags(DietaryFlags),
}

impl DietaryInfo {
    pub fn tags(tags: &[&str]) -> Self {
        DietaryInfo::Tags(tags.iter().map(|t| t.to_string()).collect())
    }

    /// Words describing this metadata, used in the recipe's text profile
    pub fn descriptors(&self) -> Vec<&str> {
        match self {
            DietaryInfo::Tags(tags) => tags.iter().map(String::as_str).collect(),
            DietaryInfo::Flags(flags) => flags.enabled(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DietaryFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vegetarian: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vegan: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gluten_free: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dairy_free: Option<bool>,
}

impl DietaryFlags {
    /// Names of the flags explicitly set to true
    pub fn enabled(&self) -> Vec<&'static str> {
        [
            ("vegetarian", self.vegetarian),
            ("vegan", self.vegan),
            ("gluten_free", self.gluten_free),
            ("dairy_free", self.dairy_free),
        ]
        .into_iter()
        .filter(|(_, flag)| *flag == Some(true))
        .map(|(name, _)| name)
        .collect()
    }
}

/// Parameters of a recommendation request
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationQuery {
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub max_cooking_time: Option<u32>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub cuisine_preference: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Default for RecommendationQuery {
    fn default() -> Self {
        Self {
            ingredients: Vec::new(),
            dietary_restrictions: Vec::new(),
            max_cooking_time: None,
            difficulty: None,
            cuisine_preference: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl RecommendationQuery {
    pub fn new<S: AsRef<str>>(ingredients: &[S]) -> Self {
        Self {
            ingredients: ingredients.iter().map(|s| s.as_ref().to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_restrictions(mut self, restrictions: &[&str]) -> Self {
        self.dietary_restrictions = restrictions.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_max_cooking_time(mut self, minutes: u32) -> Self {
        self.max_cooking_time = Some(minutes);
        self
    }

    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = Some(difficulty.into());
        self
    }

    pub fn with_cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine_preference = Some(cuisine.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Accepts minutes as a number or a numeric string; anything else (or zero) means no limit
fn lenient_minutes<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let minutes = match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(minutes
        .filter(|m| *m > 0)
        .map(|m| u32::try_from(m).unwrap_or(u32::MAX)))
}

/// A recipe ranked against a query, with derived match information
#[derive(Debug, Clone, Serialize)]
pub struct ScoredRecipe {
    #[serde(flatten)]
    pub recipe: Recipe,
    /// Overall score, 0-100 with one decimal
    pub match_score: f64,
    /// Share of the recipe's own ingredients covered by the query, 0-100 with one decimal
    pub ingredient_match_percentage: f64,
    pub missing_ingredients: Vec<String>,
    pub substitution_suggestions: BTreeMap<String, Vec<String>>,
}
