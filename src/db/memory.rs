use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::{
    db::FeedbackStore,
    error::AppResult,
    models::{Rating, RatingEntry, UserFeedback},
};

/// Process-local feedback store; contents are lost on restart
#[derive(Debug, Default)]
pub struct InMemoryFeedbackStore {
    users: RwLock<HashMap<String, UserFeedback>>,
}

impl InMemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl FeedbackStore for InMemoryFeedbackStore {
    async fn upsert_rating(
        &self,
        user_id: &str,
        recipe_id: u32,
        rating: Rating,
    ) -> AppResult<RatingEntry> {
        let entry = RatingEntry::now(rating);
        let mut users = self.users.write().await;
        users
            .entry(user_id.to_string())
            .or_default()
            .ratings
            .insert(recipe_id, entry);
        Ok(entry)
    }

    async fn set_favorite(&self, user_id: &str, recipe_id: u32, favorite: bool) -> AppResult<()> {
        let mut users = self.users.write().await;
        let favorites = &mut users.entry(user_id.to_string()).or_default().favorites;
        if favorite {
            favorites.insert(recipe_id);
        } else {
            favorites.remove(&recipe_id);
        }
        Ok(())
    }

    async fn toggle_favorite(&self, user_id: &str, recipe_id: u32) -> AppResult<bool> {
        let mut users = self.users.write().await;
        let favorites = &mut users.entry(user_id.to_string()).or_default().favorites;
        if favorites.remove(&recipe_id) {
            Ok(false)
        } else {
            favorites.insert(recipe_id);
            Ok(true)
        }
    }

    async fn get_user_data(&self, user_id: &str) -> AppResult<UserFeedback> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned().unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn rating(value: i64) -> Rating {
        Rating::try_from(value).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_user_has_empty_feedback() {
        let store = InMemoryFeedbackStore::new();
        assert_eq!(
            store.get_user_data("nobody").await.unwrap(),
            UserFeedback::default()
        );
    }

    #[tokio::test]
    async fn test_upsert_rating_replaces_previous() {
        let store = InMemoryFeedbackStore::new();
        store.upsert_rating("alice", 1, rating(2)).await.unwrap();
        store.upsert_rating("alice", 1, rating(5)).await.unwrap();
        store.upsert_rating("alice", 2, rating(3)).await.unwrap();

        let data = store.get_user_data("alice").await.unwrap();
        assert_eq!(data.ratings.len(), 2);
        assert_eq!(data.ratings[&1].rating.value(), 5);
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let store = InMemoryFeedbackStore::new();
        store.upsert_rating("alice", 1, rating(4)).await.unwrap();
        store.set_favorite("bob", 1, true).await.unwrap();

        assert!(store.get_user_data("alice").await.unwrap().favorites.is_empty());
        assert!(store.get_user_data("bob").await.unwrap().ratings.is_empty());
    }

    #[tokio::test]
    async fn test_set_and_toggle_favorite() {
        let store = InMemoryFeedbackStore::new();
        store.set_favorite("alice", 3, true).await.unwrap();
        store.set_favorite("alice", 3, true).await.unwrap();
        assert_eq!(store.get_user_data("alice").await.unwrap().favorites.len(), 1);

        assert!(!store.toggle_favorite("alice", 3).await.unwrap());
        assert!(store.toggle_favorite("alice", 3).await.unwrap());

        store.set_favorite("alice", 3, false).await.unwrap();
        assert!(store.get_user_data("alice").await.unwrap().favorites.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_toggles_are_serialized() {
        let store = Arc::new(InMemoryFeedbackStore::new());
        let mut tasks = Vec::new();

        for _ in 0..10 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.toggle_favorite("alice", 7).await.unwrap()
            }));
        }

        let mut added = 0;
        for task in tasks {
            if task.await.unwrap() {
                added += 1;
            }
        }

        // an even number of toggles leaves the recipe unfavorited
        assert_eq!(added, 5);
        assert!(store.get_user_data("alice").await.unwrap().favorites.is_empty());
    }
}
