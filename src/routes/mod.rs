use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::FeedbackStore,
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::{IngredientDetector, RecommendationEngine},
};

pub mod feedback;
pub mod ingredients;
pub mod recommendations;

/// User ID applied when a request does not name one
pub const ANONYMOUS_USER: &str = "anonymous";

/// Where uploaded images go and how large they may be
#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub dir: PathBuf,
    pub max_bytes: usize,
}

/// Shared application state
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
    pub feedback: Arc<dyn FeedbackStore>,
    pub detector: Arc<dyn IngredientDetector>,
    pub upload: UploadSettings,
}

impl AppState {
    pub fn new(
        engine: RecommendationEngine,
        feedback: Arc<dyn FeedbackStore>,
        detector: Arc<dyn IngredientDetector>,
        upload: UploadSettings,
    ) -> Self {
        Self {
            engine: Arc::new(engine),
            feedback,
            detector,
            upload,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.upload.max_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/api/health", get(health_check))
        .nest("/api", api_routes(body_limit))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api
fn api_routes(body_limit: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/ingredients", get(ingredients::list))
        .route(
            "/upload",
            post(ingredients::upload).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/recipes/suggest", post(recommendations::suggest))
        .route("/recipes/:recipe_id", get(recommendations::detail))
        .route("/recipes/:recipe_id/rate", post(feedback::rate))
        .route("/recipes/:recipe_id/favorite", post(feedback::favorite))
        .route("/user/data", get(feedback::user_data))
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "total_recipes": state.engine.recipes().len(),
            "lexical_index": state.engine.lexical_index().is_ok(),
        })),
    )
}
