use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pantry_api::{
    config::Config,
    db::{create_redis_client, FeedbackStore, InMemoryFeedbackStore, RedisFeedbackStore},
    routes::{create_router, AppState, UploadSettings},
    services::{corpus, RandomIngredientDetector, RecommendationEngine},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pantry_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let corpus = corpus::load_from_file(&config.recipes_path).await?;
    if !corpus.skipped.is_empty() {
        tracing::warn!(skipped = corpus.skipped.len(), "Some recipes were not loaded");
    }
    let engine = RecommendationEngine::new(corpus.recipes, config.scoring_policy);

    let feedback: Arc<dyn FeedbackStore> = match &config.redis_url {
        Some(url) => Arc::new(RedisFeedbackStore::new(create_redis_client(url)?)),
        None => Arc::new(InMemoryFeedbackStore::new()),
    };
    tracing::info!(store = feedback.name(), "Feedback store ready");

    let upload = UploadSettings {
        dir: PathBuf::from(&config.upload_dir),
        max_bytes: config.max_upload_bytes,
    };
    let state = Arc::new(AppState::new(
        engine,
        feedback,
        Arc::new(RandomIngredientDetector::new()),
        upload,
    ));

    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
