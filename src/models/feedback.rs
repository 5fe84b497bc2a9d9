use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Rating value outside the accepted 1-5 range
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Rating must be between 1 and 5, got {0}")]
pub struct InvalidRating(pub i64);

/// A validated recipe rating from 1 to 5 stars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = InvalidRating;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Rating(value as u8))
        } else {
            Err(InvalidRating(value))
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// A stored rating with the time it was last set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingEntry {
    pub rating: Rating,
    pub rated_at: DateTime<Utc>,
}

impl RatingEntry {
    pub fn now(rating: Rating) -> Self {
        Self {
            rating,
            rated_at: Utc::now(),
        }
    }
}

/// Everything a single user has recorded about recipes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFeedback {
    /// Ratings keyed by recipe ID
    pub ratings: BTreeMap<u32, RatingEntry>,
    /// IDs of favorited recipes
    pub favorites: BTreeSet<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert_eq!(Rating::try_from(1).unwrap().value(), 1);
        assert_eq!(Rating::try_from(5).unwrap().value(), 5);
        assert_eq!(Rating::try_from(0), Err(InvalidRating(0)));
        assert_eq!(Rating::try_from(6), Err(InvalidRating(6)));
        assert_eq!(Rating::try_from(-3), Err(InvalidRating(-3)));
    }

    #[test]
    fn test_rating_serde() {
        let rating: Rating = serde_json::from_str("4").unwrap();
        assert_eq!(rating.value(), 4);
        assert_eq!(serde_json::to_string(&rating).unwrap(), "4");
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }

    #[test]
    fn test_user_feedback_serializes_recipe_ids_as_keys() {
        let mut feedback = UserFeedback::default();
        feedback
            .ratings
            .insert(12, RatingEntry::now(Rating::try_from(3).unwrap()));
        feedback.favorites.insert(12);

        let json = serde_json::to_value(&feedback).unwrap();
        assert_eq!(json["ratings"]["12"]["rating"], 3);
        assert_eq!(json["favorites"], serde_json::json!([12]));
    }
}
