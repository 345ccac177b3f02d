pub mod api;
pub mod config;
pub mod db;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::media::MediaProcessor;
use crate::services::storage::StorageService;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::health::health_check,
        api::handlers::videos::get_video,
        api::handlers::videos::upload_video,
        api::handlers::videos::upload_thumbnail,
    ),
    components(
        schemas(
            models::Video,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "videos", description = "Video upload and publishing endpoints"),
        (name = "system", description = "Health and diagnostics")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub storage: Arc<dyn StorageService>,
    pub media: Arc<dyn MediaProcessor>,
    pub config: AppConfig,
}

/// Slack on top of the payload ceiling for multipart framing, so the
/// byte-accurate limit check stays with the stager.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.max_video_upload_size as usize + MULTIPART_OVERHEAD;
    let assets_root = state.config.assets_root.clone();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/healthz", get(api::handlers::health::health_check))
        .route("/videos/:video_id", get(api::handlers::videos::get_video))
        .route(
            "/videos/:video_id/upload",
            post(api::handlers::videos::upload_video),
        )
        .route(
            "/videos/:video_id/thumbnail",
            post(api::handlers::videos::upload_thumbnail),
        )
        .nest_service("/assets", ServeDir::new(assets_root))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
