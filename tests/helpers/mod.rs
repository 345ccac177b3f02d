#![allow(dead_code)]

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use axum::body::Body;
use axum::http::Request;
use rust_video_backend::config::AppConfig;
use rust_video_backend::services::media::{MediaError, MediaProcessor, VideoGeometry};
use rust_video_backend::services::storage::{StorageError, StorageService};
use rust_video_backend::{AppState, create_app};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempPath;

pub const BOUNDARY: &str = "---------------------------123456789012345678901234567";

pub struct StoredObject {
    pub key: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// In-memory stand-in for the S3 content store.
pub struct MockStorage {
    bucket: String,
    region: String,
    fail_puts: bool,
    pub objects: Mutex<Vec<StoredObject>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self {
            bucket: "test-bucket".to_string(),
            region: "us-east-1".to_string(),
            fail_puts: false,
            objects: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_puts: true,
            ..Self::new()
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .iter()
            .map(|o| o.key.clone())
            .collect()
    }
}

#[async_trait]
impl StorageService for MockStorage {
    async fn put_object(
        &self,
        key: &str,
        body: ByteStream,
        content_type: &str,
    ) -> Result<(), StorageError> {
        if self.fail_puts {
            return Err(StorageError::Publish("injected store failure".to_string()));
        }

        let bytes = body
            .collect()
            .await
            .map_err(|e| StorageError::Publish(e.to_string()))?
            .into_bytes()
            .to_vec();

        self.objects.lock().unwrap().push(StoredObject {
            key: key.to_string(),
            content_type: content_type.to_string(),
            bytes,
        });
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            self.bucket, self.region, key
        )
    }
}

/// Media-toolchain double: canned probe geometry, remux is a byte-for-byte
/// copy into a fresh temp path. Paths it hands out are recorded so tests can
/// assert they were cleaned up after the request.
pub struct MockMedia {
    geometry: VideoGeometry,
    pub probes: AtomicUsize,
    pub remux_outputs: Mutex<Vec<PathBuf>>,
}

impl MockMedia {
    pub fn with_geometry(width: u32, height: u32) -> Self {
        Self {
            geometry: VideoGeometry { width, height },
            probes: AtomicUsize::new(0),
            remux_outputs: Mutex::new(Vec::new()),
        }
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaProcessor for MockMedia {
    async fn probe(&self, _path: &Path) -> Result<VideoGeometry, MediaError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        Ok(self.geometry)
    }

    async fn remux(&self, path: &Path) -> Result<TempPath, MediaError> {
        let out = tempfile::Builder::new()
            .suffix(".mp4")
            .tempfile()?
            .into_temp_path();
        tokio::fs::copy(path, &*out).await?;
        self.remux_outputs
            .lock()
            .unwrap()
            .push(out.to_path_buf());
        Ok(out)
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        s3_bucket: "test-bucket".to_string(),
        s3_region: "us-east-1".to_string(),
        jwt_secret: "test-secret".to_string(),
        assets_root: std::env::temp_dir(),
        ..AppConfig::default()
    }
}

pub async fn setup_app(
    storage: std::sync::Arc<dyn StorageService>,
    media: std::sync::Arc<dyn MediaProcessor>,
    config: AppConfig,
) -> (axum::Router, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    let state = AppState {
        db: pool.clone(),
        storage,
        media,
        config,
    };
    (create_app(state), pool)
}

pub fn multipart_body(field: &str, filename: &str, content_type: &str, payload: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(uri: &str, token: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri).header(
        "Content-Type",
        format!("multipart/form-data; boundary={BOUNDARY}"),
    );
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}
