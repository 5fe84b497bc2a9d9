use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{DietaryFlags, DietaryInfo, Recipe};

const MEAT_KEYWORDS: &[&str] = &["chicken", "beef", "pork", "lamb", "fish", "shrimp", "bacon"];
const ANIMAL_PRODUCT_KEYWORDS: &[&str] = &["cheese", "milk", "butter", "eggs"];

/// A dietary restriction a recipe can be checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietaryRestriction {
    Vegetarian,
    Vegan,
    GlutenFree,
    DairyFree,
}

/// Restriction name not known to the filter
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unrecognized dietary restriction: {0}")]
pub struct RestrictionUnrecognized(pub String);

impl FromStr for DietaryRestriction {
    type Err = RestrictionUnrecognized;

    /// Case-insensitive; hyphens and underscores are interchangeable
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "vegetarian" => Ok(DietaryRestriction::Vegetarian),
            "vegan" => Ok(DietaryRestriction::Vegan),
            "gluten_free" => Ok(DietaryRestriction::GlutenFree),
            "dairy_free" => Ok(DietaryRestriction::DairyFree),
            _ => Err(RestrictionUnrecognized(s.to_string())),
        }
    }
}

impl Display for DietaryRestriction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DietaryRestriction::Vegetarian => write!(f, "vegetarian"),
            DietaryRestriction::Vegan => write!(f, "vegan"),
            DietaryRestriction::GlutenFree => write!(f, "gluten_free"),
            DietaryRestriction::DairyFree => write!(f, "dairy_free"),
        }
    }
}

/// Parses restriction names, ignoring ones the filter does not know
pub fn parse_restrictions<S: AsRef<str>>(names: &[S]) -> Vec<DietaryRestriction> {
    let mut restrictions = Vec::new();
    for name in names {
        match name.as_ref().parse::<DietaryRestriction>() {
            Ok(restriction) if !restrictions.contains(&restriction) => restrictions.push(restriction),
            Ok(_) => {}
            Err(e) => tracing::debug!(error = %e, "Ignoring dietary restriction"),
        }
    }
    restrictions
}

/// Checks a recipe against every restriction (AND, short-circuiting)
///
/// Recipes carrying boolean flags are judged by the flags alone; everything
/// else falls back to tags plus ingredient-name heuristics.
pub fn is_diet_compatible(recipe: &Recipe, restrictions: &[DietaryRestriction]) -> bool {
    restrictions.iter().all(|restriction| match &recipe.dietary_info {
        Some(DietaryInfo::Flags(flags)) => satisfies_flag(flags, *restriction),
        Some(DietaryInfo::Tags(tags)) => satisfies_heuristics(recipe, tags, *restriction),
        None => satisfies_heuristics(recipe, &[], *restriction),
    })
}

/// Absent flags count as not satisfied
fn satisfies_flag(flags: &DietaryFlags, restriction: DietaryRestriction) -> bool {
    let flag = match restriction {
        DietaryRestriction::Vegetarian => flags.vegetarian,
        DietaryRestriction::Vegan => flags.vegan,
        DietaryRestriction::GlutenFree => flags.gluten_free,
        DietaryRestriction::DairyFree => flags.dairy_free,
    };
    flag.unwrap_or(false)
}

fn satisfies_heuristics(recipe: &Recipe, tags: &[String], restriction: DietaryRestriction) -> bool {
    let has_tag = |tag: &str| tags.iter().any(|t| t.trim().eq_ignore_ascii_case(tag));

    match restriction {
        DietaryRestriction::Vegetarian => !mentions_any(recipe, MEAT_KEYWORDS),
        DietaryRestriction::Vegan => {
            !(has_tag("contains_dairy")
                || has_tag("contains_eggs")
                || mentions_any(recipe, MEAT_KEYWORDS)
                || mentions_any(recipe, ANIMAL_PRODUCT_KEYWORDS))
        }
        DietaryRestriction::GlutenFree => !has_tag("contains_gluten"),
        DietaryRestriction::DairyFree => !has_tag("contains_dairy"),
    }
}

fn mentions_any(recipe: &Recipe, keywords: &[&str]) -> bool {
    recipe.ingredients.iter().any(|ingredient| {
        let ingredient = ingredient.to_lowercase();
        keywords.iter().any(|keyword| ingredient.contains(keyword))
    })
}
