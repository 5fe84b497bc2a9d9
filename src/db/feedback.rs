use crate::{
    error::AppResult,
    models::{Rating, RatingEntry, UserFeedback},
};

/// Persistence for ratings and favorites
///
/// Implementations must make each call atomic per (user, recipe) pair;
/// callers never lock around them.
#[async_trait::async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Inserts or replaces a user's rating for a recipe
    async fn upsert_rating(
        &self,
        user_id: &str,
        recipe_id: u32,
        rating: Rating,
    ) -> AppResult<RatingEntry>;

    /// Marks or unmarks a recipe as a favorite
    async fn set_favorite(&self, user_id: &str, recipe_id: u32, favorite: bool) -> AppResult<()>;

    /// Flips the favorite state and returns the new state
    async fn toggle_favorite(&self, user_id: &str, recipe_id: u32) -> AppResult<bool>;

    /// All ratings and favorites recorded for a user
    async fn get_user_data(&self, user_id: &str) -> AppResult<UserFeedback>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
