use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{Recipe, RecommendationQuery, ScoredRecipe},
    routes::AppState,
};

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub success: bool,
    pub recipes: Vec<ScoredRecipe>,
    pub count: usize,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub success: bool,
    pub recipe: Recipe,
}

/// Handler for recipe suggestions
pub async fn suggest(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RecommendationQuery>, JsonRejection>,
) -> AppResult<Json<SuggestResponse>> {
    let Json(query) =
        payload.map_err(|e| AppError::InvalidInput(format!("Invalid request body: {}", e)))?;

    if query.ingredients.iter().all(|i| i.trim().is_empty()) {
        return Err(AppError::InvalidInput("No ingredients provided".to_string()));
    }
    if query.limit == 0 {
        return Err(AppError::InvalidInput("limit must be at least 1".to_string()));
    }

    tracing::info!(
        request_id = %request_id,
        ingredients = query.ingredients.len(),
        restrictions = query.dietary_restrictions.len(),
        limit = query.limit,
        "Processing recipe suggestion request"
    );

    let recipes = state.engine.recommend(&query);
    let count = recipes.len();

    Ok(Json(SuggestResponse {
        success: true,
        recipes,
        count,
        message: format!("Found {} matching recipes", count),
    }))
}

/// Handler for a single recipe's details
pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(recipe_id): Path<u32>,
) -> AppResult<Json<RecipeResponse>> {
    let recipe = state
        .engine
        .get(recipe_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Recipe {} not found", recipe_id)))?;

    Ok(Json(RecipeResponse {
        success: true,
        recipe,
    }))
}
