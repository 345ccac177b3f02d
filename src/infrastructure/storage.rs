use aws_sdk_s3::config::Region;
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::services::storage::S3StorageService;

/// Build the S3 client from the default AWS credential chain plus the
/// configured region, and wrap it in the content-store service.
pub async fn setup_storage(config: &AppConfig) -> Arc<S3StorageService> {
    info!(
        "☁️  S3 Storage: bucket '{}' in {}",
        config.s3_bucket, config.s3_region
    );

    let aws_config = aws_config::from_env()
        .region(Region::new(config.s3_region.clone()))
        .load()
        .await;

    let s3_client = aws_sdk_s3::Client::new(&aws_config);
    Arc::new(S3StorageService::new(
        s3_client,
        config.s3_bucket.clone(),
        config.s3_region.clone(),
    ))
}
