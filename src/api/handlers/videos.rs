use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::HeaderMap,
};
use futures::TryStreamExt;
use tokio_util::io::StreamReader;

use crate::AppState;
use crate::api::error::AppError;
use crate::db;
use crate::models::Video;
use crate::services::media::Orientation;
use crate::services::staging;
use crate::utils::auth;
use crate::utils::keys;

/// Content types accepted for thumbnail uploads, with their asset extension.
const SUPPORTED_THUMBNAIL_TYPES: &[(&str, &str)] = &[("image/jpeg", "jpeg"), ("image/png", "png")];

/// The only video container accepted for upload.
const SUPPORTED_VIDEO_TYPE: &str = "video/mp4";

/// Authenticate the caller and load the record they are acting on, refusing
/// records owned by someone else.
async fn authorize_video_access(
    state: &AppState,
    headers: &HeaderMap,
    video_id: &str,
) -> Result<Video, AppError> {
    let token = auth::bearer_token(headers)
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    let claims = auth::validate_jwt(token, &state.config.jwt_secret).map_err(|e| {
        tracing::debug!("JWT validation failed: {}", e);
        AppError::Unauthorized("Invalid bearer token".to_string())
    })?;

    let video = db::get_video(&state.db, video_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

    if video.user_id != claims.sub {
        return Err(AppError::Forbidden(
            "You do not own this video".to_string(),
        ));
    }

    Ok(video)
}

fn parse_media_type(content_type: Option<&str>) -> Result<mime::Mime, AppError> {
    let raw = content_type
        .ok_or_else(|| AppError::BadRequest("Missing content type on upload field".to_string()))?;

    raw.parse::<mime::Mime>()
        .map_err(|_| AppError::BadRequest(format!("Invalid content type '{}'", raw)))
}

#[utoipa::path(
    get,
    path = "/videos/{video_id}",
    params(
        ("video_id" = String, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video metadata", body = Video),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Video owned by another user"),
        (status = 404, description = "Video not found")
    ),
    tag = "videos"
)]
pub async fn get_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Video>, AppError> {
    let video = authorize_video_access(&state, &headers, &video_id).await?;
    Ok(Json(video))
}

#[utoipa::path(
    post,
    path = "/videos/{video_id}/upload",
    params(
        ("video_id" = String, Path, description = "Video ID")
    ),
    request_body(content = String, content_type = "multipart/form-data", description = "Multipart body with a `video` field (video/mp4)"),
    responses(
        (status = 200, description = "Video published", body = Video),
        (status = 400, description = "Missing field or unsupported media type"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Video owned by another user"),
        (status = 404, description = "Video not found"),
        (status = 413, description = "Upload exceeds the size limit"),
        (status = 500, description = "Pipeline or store failure")
    ),
    tag = "videos"
)]
pub async fn upload_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Video>, AppError> {
    let mut video = authorize_video_access(&state, &headers, &video_id).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("video") {
            continue;
        }

        let media_type = parse_media_type(field.content_type())?;
        if media_type.essence_str() != SUPPORTED_VIDEO_TYPE {
            return Err(AppError::UnsupportedMediaType(format!(
                "'{}' is not supported, upload {}",
                media_type, SUPPORTED_VIDEO_TYPE
            )));
        }

        // Stage to local disk; the limit is enforced while the body streams
        // in. Both temp files below clean themselves up on any exit path.
        let body_reader = StreamReader::new(
            field.map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err)),
        );
        let staged = staging::stage_stream(body_reader, state.config.max_video_upload_size).await?;
        tracing::info!(
            video_id = %video.id,
            bytes = staged.size(),
            "staged video upload"
        );

        let geometry = state.media.probe(staged.path()).await?;
        let orientation = Orientation::classify(geometry.width, geometry.height);

        let remuxed = state.media.remux(staged.path()).await?;

        let key = keys::derive_video_key(orientation);
        let body = aws_sdk_s3::primitives::ByteStream::from_path(&*remuxed)
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        state
            .storage
            .put_object(&key, body, media_type.essence_str())
            .await?;

        let url = state.storage.public_url(&key);
        tracing::info!(video_id = %video.id, key = %key, "published video");

        video.video_url = Some(url);
        db::update_video(&state.db, &mut video).await?;

        return Ok(Json(video));
    }

    Err(AppError::BadRequest(
        "Missing 'video' form field".to_string(),
    ))
}

#[utoipa::path(
    post,
    path = "/videos/{video_id}/thumbnail",
    params(
        ("video_id" = String, Path, description = "Video ID")
    ),
    request_body(content = String, content_type = "multipart/form-data", description = "Multipart body with a `thumbnail` field (image/jpeg or image/png)"),
    responses(
        (status = 200, description = "Thumbnail stored", body = Video),
        (status = 400, description = "Missing field or unsupported media type"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Video owned by another user"),
        (status = 404, description = "Video not found"),
        (status = 413, description = "Upload exceeds the size limit")
    ),
    tag = "videos"
)]
pub async fn upload_thumbnail(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Video>, AppError> {
    let mut video = authorize_video_access(&state, &headers, &video_id).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("thumbnail") {
            continue;
        }

        let media_type = parse_media_type(field.content_type())?;
        let extension = SUPPORTED_THUMBNAIL_TYPES
            .iter()
            .find(|(essence, _)| *essence == media_type.essence_str())
            .map(|(_, ext)| *ext)
            .ok_or_else(|| {
                AppError::UnsupportedMediaType(format!(
                    "'{}' is not supported, upload image/jpeg or image/png",
                    media_type
                ))
            })?;

        // Stage first so a failed or oversized upload never leaves a partial
        // file under the asset root.
        let body_reader = StreamReader::new(
            field.map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err)),
        );
        let staged = staging::stage_stream(body_reader, state.config.max_thumbnail_size).await?;

        let file_name = format!("{}.{}", keys::random_token(), extension);
        let dest = state.config.assets_root.join(&file_name);
        tokio::fs::copy(staged.path(), &dest).await?;
        tracing::info!(
            video_id = %video.id,
            bytes = staged.size(),
            asset = %file_name,
            "stored thumbnail"
        );

        let url = format!(
            "http://localhost:{}/assets/{}",
            state.config.port, file_name
        );
        video.thumbnail_url = Some(url);
        db::update_video(&state.db, &mut video).await?;

        return Ok(Json(video));
    }

    Err(AppError::BadRequest(
        "Missing 'thumbnail' form field".to_string(),
    ))
}
