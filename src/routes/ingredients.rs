use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::DetectedIngredient,
    routes::AppState,
};

/// Image extensions accepted by the upload endpoint
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Multipart field carrying the image
const IMAGE_FIELD: &str = "image";

#[derive(Debug, Serialize)]
pub struct IngredientsResponse {
    pub success: bool,
    pub ingredients: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub detected_ingredients: Vec<DetectedIngredient>,
    pub message: String,
}

/// Handler listing every known ingredient, for autocomplete
pub async fn list(State(state): State<Arc<AppState>>) -> Json<IngredientsResponse> {
    Json(IngredientsResponse {
        success: true,
        ingredients: state.engine.all_ingredients(),
    })
}

/// Lower-cased extension of an allowed image file name
pub fn allowed_extension(file_name: &str) -> Option<String> {
    let extension = Path::new(file_name).extension()?.to_str()?.to_lowercase();
    let allowed = ALLOWED_EXTENSIONS.contains(&extension.as_str());
    allowed.then_some(extension)
}

/// Keeps the status multer reports, so an oversized body is a 413
fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::Upload(err.body_text())
    }
}

/// Handler for image upload and ingredient detection
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(multipart_error)?;
        image = Some((file_name, data));
        break;
    }

    let (file_name, data) =
        image.ok_or_else(|| AppError::Upload("No image file provided".to_string()))?;
    if file_name.is_empty() {
        return Err(AppError::Upload("No file selected".to_string()));
    }
    let extension =
        allowed_extension(&file_name).ok_or_else(|| AppError::Upload("Invalid file type".to_string()))?;
    if data.is_empty() {
        return Err(AppError::Upload("Uploaded file is empty".to_string()));
    }

    tokio::fs::create_dir_all(&state.upload.dir)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create upload directory: {}", e)))?;
    let stored_path = state
        .upload
        .dir
        .join(format!("{}.{}", Uuid::new_v4(), extension));
    tokio::fs::write(&stored_path, &data)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store upload: {}", e)))?;

    let detected_ingredients = state.detector.detect(&data).await?;

    tracing::info!(
        path = %stored_path.display(),
        bytes = data.len(),
        detector = state.detector.name(),
        detected = detected_ingredients.len(),
        "Processed image upload"
    );

    Ok(Json(UploadResponse {
        success: true,
        message: format!("Detected {} ingredients", detected_ingredients.len()),
        detected_ingredients,
    }))
}
