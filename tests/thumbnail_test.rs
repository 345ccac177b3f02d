mod helpers;

use axum::http::StatusCode;
use helpers::{MockMedia, MockStorage, multipart_body, multipart_request, setup_app, test_config};
use http_body_util::BodyExt;
use rust_video_backend::db;
use rust_video_backend::utils::auth::create_jwt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

#[tokio::test]
async fn test_thumbnail_stored_under_assets_root() {
    let assets = tempfile::tempdir().unwrap();
    let mut config = test_config();
    config.assets_root = assets.path().to_path_buf();
    let port = config.port;

    let storage = Arc::new(MockStorage::new());
    let media = Arc::new(MockMedia::with_geometry(1920, 1080));
    let (app, pool) = setup_app(storage, media, config).await;

    let video = db::create_video(&pool, "user-1", "My clip", None)
        .await
        .unwrap();
    let token = create_jwt("user-1", "test-secret").unwrap();

    let payload = b"\xFF\xD8\xFF\xE0 fake jpeg".to_vec();
    let body = multipart_body("thumbnail", "thumb.jpg", "image/jpeg", &payload);
    let response = app
        .oneshot(multipart_request(
            &format!("/videos/{}/thumbnail", video.id),
            Some(&token),
            body,
        ))
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if status != StatusCode::OK {
        panic!(
            "Thumbnail upload failed with status {}: {:?}",
            status,
            String::from_utf8_lossy(&bytes)
        );
    }

    let json: Value = serde_json::from_slice(&bytes).unwrap();
    let url = json["thumbnail_url"].as_str().unwrap();
    let prefix = format!("http://localhost:{}/assets/", port);
    let file_name = url.strip_prefix(&prefix).expect("asset URL prefix");
    assert!(file_name.ends_with(".jpeg"));

    let on_disk = std::fs::read(assets.path().join(file_name)).unwrap();
    assert_eq!(on_disk, payload);

    let stored_url: Option<String> =
        sqlx::query_scalar("SELECT thumbnail_url FROM videos WHERE id = ?")
            .bind(&video.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(stored_url.as_deref(), Some(url));
}

#[tokio::test]
async fn test_thumbnail_rejects_unsupported_type() {
    let assets = tempfile::tempdir().unwrap();
    let mut config = test_config();
    config.assets_root = assets.path().to_path_buf();

    let storage = Arc::new(MockStorage::new());
    let media = Arc::new(MockMedia::with_geometry(1920, 1080));
    let (app, pool) = setup_app(storage, media, config).await;

    let video = db::create_video(&pool, "user-1", "My clip", None)
        .await
        .unwrap();
    let token = create_jwt("user-1", "test-secret").unwrap();

    let body = multipart_body("thumbnail", "thumb.gif", "image/gif", b"GIF89a");
    let response = app
        .oneshot(multipart_request(
            &format!("/videos/{}/thumbnail", video.id),
            Some(&token),
            body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(std::fs::read_dir(assets.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_thumbnail_rejects_foreign_owner() {
    let assets = tempfile::tempdir().unwrap();
    let mut config = test_config();
    config.assets_root = assets.path().to_path_buf();

    let storage = Arc::new(MockStorage::new());
    let media = Arc::new(MockMedia::with_geometry(1920, 1080));
    let (app, pool) = setup_app(storage, media, config).await;

    let video = db::create_video(&pool, "user-2", "Someone else's clip", None)
        .await
        .unwrap();
    let token = create_jwt("user-1", "test-secret").unwrap();

    let body = multipart_body("thumbnail", "thumb.png", "image/png", b"\x89PNG");
    let response = app
        .oneshot(multipart_request(
            &format!("/videos/{}/thumbnail", video.id),
            Some(&token),
            body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(std::fs::read_dir(assets.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_thumbnail_over_ceiling_is_payload_too_large() {
    let assets = tempfile::tempdir().unwrap();
    let mut config = test_config();
    config.assets_root = assets.path().to_path_buf();
    config.max_thumbnail_size = 512;

    let storage = Arc::new(MockStorage::new());
    let media = Arc::new(MockMedia::with_geometry(1920, 1080));
    let (app, pool) = setup_app(storage, media, config).await;

    let video = db::create_video(&pool, "user-1", "My clip", None)
        .await
        .unwrap();
    let token = create_jwt("user-1", "test-secret").unwrap();

    let oversized = vec![0u8; 4096];
    let body = multipart_body("thumbnail", "thumb.png", "image/png", &oversized);
    let response = app
        .oneshot(multipart_request(
            &format!("/videos/{}/thumbnail", video.id),
            Some(&token),
            body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(std::fs::read_dir(assets.path()).unwrap().count(), 0);
}
