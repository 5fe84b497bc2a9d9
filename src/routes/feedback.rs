use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{Rating, RatingEntry},
    routes::{AppState, ANONYMOUS_USER},
};

fn anonymous() -> String {
    ANONYMOUS_USER.to_string()
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    #[serde(default = "anonymous")]
    pub user_id: String,
    pub rating: i64,
}

#[derive(Debug, Serialize)]
pub struct RateResponse {
    pub success: bool,
    pub recipe_id: u32,
    pub rating: RatingEntry,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct FavoriteRequest {
    #[serde(default = "anonymous")]
    pub user_id: String,
    /// Explicit state; the favorite is toggled when absent
    #[serde(default, alias = "is_favorite")]
    pub favorite: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub success: bool,
    pub recipe_id: u32,
    pub is_favorite: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct UserDataQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserDataResponse {
    pub success: bool,
    pub user_id: String,
    pub ratings: BTreeMap<u32, RatingEntry>,
    pub favorites: BTreeSet<u32>,
}

fn ensure_recipe_exists(state: &AppState, recipe_id: u32) -> AppResult<()> {
    state
        .engine
        .get(recipe_id)
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound(format!("Recipe {} not found", recipe_id)))
}

/// Handler for rating a recipe
pub async fn rate(
    State(state): State<Arc<AppState>>,
    Path(recipe_id): Path<u32>,
    payload: Result<Json<RateRequest>, JsonRejection>,
) -> AppResult<Json<RateResponse>> {
    let Json(request) =
        payload.map_err(|e| AppError::InvalidInput(format!("Invalid rating request: {}", e)))?;
    let rating = Rating::try_from(request.rating)?;
    ensure_recipe_exists(&state, recipe_id)?;

    let entry = state
        .feedback
        .upsert_rating(&request.user_id, recipe_id, rating)
        .await?;

    tracing::info!(
        user_id = %request.user_id,
        recipe_id,
        rating = rating.value(),
        store = state.feedback.name(),
        "Rating saved"
    );

    Ok(Json(RateResponse {
        success: true,
        recipe_id,
        rating: entry,
        message: "Rating saved successfully".to_string(),
    }))
}

/// Handler for setting or toggling a favorite
pub async fn favorite(
    State(state): State<Arc<AppState>>,
    Path(recipe_id): Path<u32>,
    payload: Option<Json<FavoriteRequest>>,
) -> AppResult<Json<FavoriteResponse>> {
    ensure_recipe_exists(&state, recipe_id)?;

    let (user_id, desired) = match payload {
        Some(Json(request)) => (request.user_id, request.favorite),
        None => (anonymous(), None),
    };

    let is_favorite = match desired {
        Some(favorite) => {
            state
                .feedback
                .set_favorite(&user_id, recipe_id, favorite)
                .await?;
            favorite
        }
        None => state.feedback.toggle_favorite(&user_id, recipe_id).await?,
    };

    tracing::info!(user_id = %user_id, recipe_id, is_favorite, "Favorite updated");

    let message = if is_favorite {
        "Added to favorites"
    } else {
        "Removed from favorites"
    };

    Ok(Json(FavoriteResponse {
        success: true,
        recipe_id,
        is_favorite,
        message: message.to_string(),
    }))
}

/// Handler for a user's ratings and favorites
pub async fn user_data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserDataQuery>,
) -> AppResult<Json<UserDataResponse>> {
    let user_id = params
        .user_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(anonymous);

    let data = state.feedback.get_user_data(&user_id).await?;

    Ok(Json(UserDataResponse {
        success: true,
        user_id,
        ratings: data.ratings,
        favorites: data.favorites,
    }))
}
