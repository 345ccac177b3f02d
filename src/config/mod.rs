use std::env;
use std::path::PathBuf;

/// Process-wide configuration, loaded once at startup and immutable afterwards.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite connection string for the video metadata store
    pub database_url: String,

    /// S3 bucket receiving published videos
    pub s3_bucket: String,

    /// AWS region the bucket lives in (also part of the public URL)
    pub s3_region: String,

    /// Secret used to sign and verify JWT bearer tokens
    pub jwt_secret: String,

    /// Local directory for thumbnail assets, served under /assets
    pub assets_root: PathBuf,

    /// Port the HTTP server binds to
    pub port: u16,

    /// Maximum video upload size in bytes (default: 1 GiB)
    pub max_video_upload_size: u64,

    /// Maximum thumbnail upload size in bytes (default: 10 MiB)
    pub max_thumbnail_size: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:videos.db?mode=rwc".to_string(),
            s3_bucket: "videos".to_string(),
            s3_region: "us-east-1".to_string(),
            jwt_secret: "secret".to_string(),
            assets_root: PathBuf::from("assets"),
            port: 8091,
            max_video_upload_size: 1 << 30, // 1 GiB
            max_thumbnail_size: 10 << 20,   // 10 MiB
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(default.database_url),

            s3_bucket: env::var("S3_BUCKET").unwrap_or(default.s3_bucket),

            s3_region: env::var("AWS_REGION").unwrap_or(default.s3_region),

            jwt_secret: env::var("JWT_SECRET").unwrap_or(default.jwt_secret),

            assets_root: env::var("ASSETS_ROOT")
                .map(PathBuf::from)
                .unwrap_or(default.assets_root),

            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            max_video_upload_size: env::var("MAX_VIDEO_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_video_upload_size),

            max_thumbnail_size: env::var("MAX_THUMBNAIL_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_thumbnail_size),
        }
    }
}
