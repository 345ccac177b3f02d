use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::time::Duration;
use tracing::info;

use crate::config::AppConfig;

pub async fn setup_database(config: &AppConfig) -> anyhow::Result<SqlitePool> {
    info!("📂 Database: {}", config.database_url);

    let pool = SqlitePoolOptions::new()
        .max_connections(16)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database_url)
        .await?;

    info!("🔄 Running migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    info!("✅ Database ready");
    Ok(pool)
}
