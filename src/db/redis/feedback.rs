use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Display;

use redis::{AsyncCommands, Client};

use crate::{
    db::FeedbackStore,
    error::{AppError, AppResult},
    models::{Rating, RatingEntry, UserFeedback},
};

/// Removes the member if present, adds it otherwise; returns 1 when now a member
const TOGGLE_MEMBER_SCRIPT: &str = r#"
if redis.call('SREM', KEYS[1], ARGV[1]) == 1 then
    return 0
end
redis.call('SADD', KEYS[1], ARGV[1])
return 1
"#;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeedbackKey {
    /// Hash of recipe ID → JSON `RatingEntry`
    Ratings(String),
    /// Set of favorited recipe IDs
    Favorites(String),
}

impl Display for FeedbackKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedbackKey::Ratings(user_id) => write!(f, "feedback:ratings:{}", user_id),
            FeedbackKey::Favorites(user_id) => write!(f, "feedback:favorites:{}", user_id),
        }
    }
}

/// Creates a Redis client for the feedback store
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Feedback store backed by one Redis hash and one set per user
///
/// Every operation is a single Redis command (or script), so concurrent
/// writers to the same key are serialized by Redis itself.
#[derive(Clone)]
pub struct RedisFeedbackStore {
    redis_client: Client,
}

impl RedisFeedbackStore {
    pub fn new(redis_client: Client) -> Self {
        Self { redis_client }
    }
}

#[async_trait::async_trait]
impl FeedbackStore for RedisFeedbackStore {
    async fn upsert_rating(
        &self,
        user_id: &str,
        recipe_id: u32,
        rating: Rating,
    ) -> AppResult<RatingEntry> {
        let entry = RatingEntry::now(rating);
        let json = serde_json::to_string(&entry)
            .map_err(|e| AppError::Internal(format!("Rating serialization error: {}", e)))?;

        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn
            .hset(FeedbackKey::Ratings(user_id.to_string()).to_string(), recipe_id, json)
            .await?;

        tracing::debug!(user_id, recipe_id, rating = rating.value(), "Stored rating");
        Ok(entry)
    }

    async fn set_favorite(&self, user_id: &str, recipe_id: u32, favorite: bool) -> AppResult<()> {
        let key = FeedbackKey::Favorites(user_id.to_string()).to_string();
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;

        let _: usize = if favorite {
            conn.sadd(key, recipe_id).await?
        } else {
            conn.srem(key, recipe_id).await?
        };
        Ok(())
    }

    async fn toggle_favorite(&self, user_id: &str, recipe_id: u32) -> AppResult<bool> {
        let key = FeedbackKey::Favorites(user_id.to_string()).to_string();
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;

        let now_member: i64 = redis::Script::new(TOGGLE_MEMBER_SCRIPT)
            .key(key)
            .arg(recipe_id)
            .invoke_async(&mut conn)
            .await?;
        Ok(now_member == 1)
    }

    async fn get_user_data(&self, user_id: &str) -> AppResult<UserFeedback> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;

        let raw_ratings: HashMap<u32, String> = conn
            .hgetall(FeedbackKey::Ratings(user_id.to_string()).to_string())
            .await?;
        let favorites: BTreeSet<u32> = conn
            .smembers(FeedbackKey::Favorites(user_id.to_string()).to_string())
            .await?;

        let mut ratings = BTreeMap::new();
        for (recipe_id, json) in raw_ratings {
            match serde_json::from_str::<RatingEntry>(&json) {
                Ok(entry) => {
                    ratings.insert(recipe_id, entry);
                }
                Err(e) => {
                    tracing::warn!(user_id, recipe_id, error = %e, "Ignoring unreadable rating");
                }
            }
        }

        Ok(UserFeedback { ratings, favorites })
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
