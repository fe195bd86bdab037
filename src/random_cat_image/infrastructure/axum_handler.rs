use crate::application::error::ApplicationError;
use axum::{
    body::Body,
    extract::State,
    http::header::{self, HeaderName},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::application::cat_image_service::CatImageService;
use crate::domain::fetch_config::FetchConfig;
use crate::infrastructure::file_storage::LocalFileStorage;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CatImageService>,
    pub config: FetchConfig,
    pub storage: Arc<LocalFileStorage>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(vec![HeaderName::from_static("content-type")]);

    Router::new()
        .route("/api/cat", get(cat_json_handler))
        .route("/cat/download", get(download_handler))
        .route("/cat/save", post(save_handler))
        .layer(cors)
        .with_state(Arc::new(state))
}

// The service blocks on network I/O, keep it off the async workers.
async fn fetch_image_bytes(state: &AppState) -> Result<Vec<u8>, ApplicationError> {
    let service = Arc::clone(&state.service);
    let config = state.config.clone();
    tokio::task::spawn_blocking(move || service.get_bytes(&config))
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
}

fn timestamped_file_name() -> String {
    format!("random-cat-{}.jpg", Utc::now().timestamp())
}

pub async fn cat_json_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApplicationError> {
    let service = Arc::clone(&state.service);
    let config = state.config.clone();
    let image = tokio::task::spawn_blocking(move || service.get(&config))
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))??;

    Ok(Json(json!({
        "success": true,
        "image": format!("data:image/jpeg;base64,{}", image),
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })))
}

pub async fn download_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApplicationError> {
    let image_data = fetch_image_bytes(&state).await?;

    Response::builder()
        .header(header::CONTENT_TYPE, "image/jpeg")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", timestamped_file_name()),
        )
        .body(Body::from(image_data))
        .map_err(|e| ApplicationError::Internal(format!("Failed to build download response: {}", e)))
}

pub async fn save_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApplicationError> {
    let image_data = fetch_image_bytes(&state).await?;
    let file_name = timestamped_file_name();
    let path = state.storage.save_named(&file_name, &image_data).await?;
    tracing::info!(path = %path.display(), "cat image saved");

    Ok(Json(json!({ "success": true, "filename": file_name })))
}
